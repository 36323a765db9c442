use recipe_distill::{parse_html, ParseError, UnitKind};

fn create_recipe_html(json_ld: &str) -> String {
    format!(
        r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>Recipe Page</title>
            <script type="application/ld+json">
                {json_ld}
            </script>
        </head>
        <body>
            <h1>Recipe</h1>
        </body>
        </html>
        "#
    )
}

#[test]
fn test_json_ld_happy_path() {
    let json_ld = r#"
    {
        "@context": "https://schema.org",
        "@type": "Recipe",
        "name": "Simple Bake",
        "recipeIngredient": ["2 cups flour", "1/2 tsp salt"],
        "recipeInstructions": [
            {"@type": "HowToStep", "text": "Mix flour and salt."},
            {"@type": "HowToStep", "text": "Bake for 45 minutes."}
        ]
    }
    "#;
    let recipe = parse_html(
        &create_recipe_html(json_ld),
        Some("https://example.com/simple-bake"),
    )
    .unwrap();

    assert_eq!(recipe.title, "Simple Bake");
    assert_eq!(recipe.ingredients.len(), 2);

    let flour = &recipe.ingredients[0];
    assert_eq!(flour.name, "flour");
    assert_eq!(flour.quantity.as_ref().unwrap().value, 2.0);
    assert_eq!(flour.quantity.as_ref().unwrap().unit, UnitKind::Cup);

    let salt = &recipe.ingredients[1];
    assert_eq!(salt.name, "salt");
    assert_eq!(salt.quantity.as_ref().unwrap().value, 0.5);
    assert_eq!(salt.quantity.as_ref().unwrap().unit, UnitKind::Teaspoon);

    assert_eq!(recipe.steps.len(), 2);
    assert_eq!(recipe.steps[0].text, "Mix flour and salt.");
    assert!(recipe.steps[0].timers.is_empty());
    assert_eq!(recipe.steps[1].timers.len(), 1);
    assert_eq!(recipe.steps[1].timers[0].seconds, 2700);
    assert_eq!(recipe.steps[1].timers[0].label, "Bake");

    assert_eq!(recipe.source_title.as_deref(), Some("example.com"));
}

#[test]
fn test_metadata_flows_to_recipe() {
    let json_ld = r#"
    {
        "@type": "Recipe",
        "name": "Weekend Chili",
        "image": "https://example.com/chili.jpg",
        "recipeYield": "6 bowls",
        "totalTime": "PT1H30M",
        "recipeCuisine": "Tex-Mex",
        "keywords": "chili; beans; weeknight",
        "recipeIngredient": ["1 lb ground beef", "2 cans kidney beans"],
        "recipeInstructions": ["Brown the beef. Simmer everything for 1 hour."]
    }
    "#;
    let recipe = parse_html(&create_recipe_html(json_ld), Some("https://example.com/chili"))
        .unwrap();

    assert_eq!(recipe.yields, "6 bowls");
    assert_eq!(recipe.total_minutes, Some(90));
    assert_eq!(recipe.image_url.as_deref(), Some("https://example.com/chili.jpg"));
    assert_eq!(recipe.tags, vec!["Tex-Mex", "chili", "beans", "weeknight"]);
    assert_eq!(recipe.ingredients[1].quantity.as_ref().unwrap().unit, UnitKind::Can);
}

#[test]
fn test_howto_sections_become_step_sections() {
    let json_ld = r#"
    {
        "@type": "Recipe",
        "name": "Layered Dessert",
        "recipeIngredient": ["2 cups cream", "1 cup biscuits"],
        "recipeInstructions": [
            {
                "@type": "HowToSection",
                "name": "Base",
                "itemListElement": [
                    {"@type": "HowToStep", "text": "Crush the biscuits."}
                ]
            },
            {
                "@type": "HowToSection",
                "name": "Topping",
                "itemListElement": [
                    {"@type": "HowToStep", "text": "Whip the cream."}
                ]
            }
        ]
    }
    "#;
    let recipe = parse_html(&create_recipe_html(json_ld), None).unwrap();

    assert_eq!(recipe.steps.len(), 2);
    assert_eq!(recipe.steps[0].section.as_deref(), Some("Base"));
    assert_eq!(recipe.steps[1].section.as_deref(), Some("Topping"));
    assert_eq!(recipe.step_sections.len(), 2);
    assert_eq!(recipe.step_sections[0].name.as_deref(), Some("Base"));
}

#[test]
fn test_no_recipe_in_json_ld_falls_back() {
    // JSON-LD present but not a recipe; the heuristic strategy picks it up
    let html = r#"
        <html>
        <head>
            <script type="application/ld+json">{"@type": "WebSite", "name": "Food Blog"}</script>
        </head>
        <body>
            <h1>Skillet Cornbread</h1>
            <ul class="recipe-ingredients">
                <li>1 cup cornmeal</li>
                <li>1 cup buttermilk</li>
            </ul>
            <ol>
                <li>Heat the skillet until smoking.</li>
                <li>Pour in the batter and bake for 25 minutes.</li>
            </ol>
        </body>
        </html>
    "#;
    let recipe = parse_html(html, None).unwrap();
    assert_eq!(recipe.title, "Skillet Cornbread");
    assert_eq!(recipe.ingredients.len(), 2);
    assert_eq!(recipe.steps.len(), 2);
}

#[test]
fn test_no_recipe_anywhere() {
    let html = "<html><body><p>Ten travel tips for the summer.</p></body></html>";
    assert_eq!(parse_html(html, None), Err(ParseError::NoRecipeFound));
}

use log::debug;
use std::env;
use std::io::Read;

use recipe_distill::{parse_html, parse_text};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let mut path: Option<String> = None;
    let mut source_url: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--url" => {
                source_url = Some(args.next().ok_or("--url requires a value")?);
            }
            "--help" | "-h" => {
                eprintln!("usage: recipe-distill [--url <source-url>] <file | ->");
                return Ok(());
            }
            other => path = Some(other.to_string()),
        }
    }

    let path = path.ok_or("Please provide a file path, or - for stdin")?;
    let input = if path == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(&path)?
    };

    // an angle-bracketed document goes through the HTML strategies,
    // anything else through the plain-text path
    let looks_like_html = input.trim_start().starts_with('<') || input.contains("</");
    debug!("input: {} bytes, html: {}", input.len(), looks_like_html);

    let recipe = if looks_like_html {
        parse_html(&input, source_url.as_deref())?
    } else {
        parse_text(&input)?
    };

    println!("{}", serde_json::to_string_pretty(&recipe)?);
    Ok(())
}

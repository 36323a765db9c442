use thiserror::Error;

/// Errors surfaced by recipe extraction and assembly
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Malformed URL or input that cannot be interpreted at all
    #[error("Invalid source: {0}")]
    InvalidSource(String),

    /// Recipe-shaped content was found but no ingredients survived parsing
    #[error("No ingredients found in the document")]
    NoIngredientsFound,

    /// Recipe-shaped content was found but no steps survived parsing
    #[error("No steps found in the document")]
    NoStepsFound,

    /// Neither the structured nor the heuristic strategy located
    /// recipe-shaped content
    #[error("No recipe found in the document")]
    NoRecipeFound,

    /// No usable image reference could be resolved
    #[error("No recipe image found")]
    ImageNotFound,

    /// The source URL belongs to a platform without an adapter
    #[error("Platform not supported: {0}")]
    PlatformNotSupported(String),
}

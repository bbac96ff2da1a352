// Parsers for chat turns and backend responses

pub mod entities;
pub mod intelligence;

pub use entities::{
    extract, extract_user_company, is_self_referential, EntityExtractor, ExtractedEntities,
    HeuristicExtractor, SELF_REFERENTIAL_PHRASES,
};
pub use intelligence::{extract_json_blocks, normalize, normalize_text};

mod engine_config;
mod input_record;
mod tax_bracket;

pub use engine_config::EngineConfig;
pub use input_record::InputRecord;
pub use tax_bracket::{TaxBracket, TaxTable};

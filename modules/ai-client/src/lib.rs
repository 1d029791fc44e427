pub mod openai;
pub mod schema;
pub mod traits;
pub mod util;

pub use openai::OpenAi;
pub use schema::StructuredOutput;
pub use traits::EmbedAgent;

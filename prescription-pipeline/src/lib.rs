pub mod crawler;
pub mod error;
pub mod expander;
pub mod llm;
pub mod models;
pub mod ontology;
pub mod orchestrator;
pub mod preprocess;
pub mod prompts;
pub mod report;
pub mod search;
pub mod sources;
pub mod storage;

// Re-export commonly used types
pub use crawler::{HttpPageFetcher, PageFetcher, WebCrawler};
pub use error::{PipelineError, Result};
pub use expander::QueryExpander;
pub use llm::{GeminiClient, Generate, LlmError};
pub use models::{
    CaseOutcome, Diagnostic, MedicationEntry, ParsedReport, PrescriptionRecord, SearchResult,
    SourceRef, Stage,
};
pub use ontology::MedicalOntology;
pub use orchestrator::{Orchestrator, PipelineConfig};
pub use search::{CustomSearchApi, SearchApi, SearchEngine, SearchItem, SearchOutcome};
pub use sources::SourceEvaluator;
pub use storage::{ArticleStore, InMemoryArticleStore, StoredArticle};

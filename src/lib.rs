pub mod authentication;
pub mod config;
pub mod message;
pub mod report;
pub mod routing;
pub mod verdict;

pub use authentication::{
    AuthClassifier, AuthStatus, AuthenticationAnalyzer, AuthenticationResults,
    AuthenticationStatus, HeuristicClassifier, Mechanism,
};
pub use config::{AnalyzerConfig, OutputFormat};
pub use message::{AnalyzerError, ParsedMessage};
pub use report::ReportFormatter;
pub use routing::{RoutingHop, RoutingInfo};
pub use verdict::{analyze, AnalysisReport, EmailAnalyzer, Verdict};

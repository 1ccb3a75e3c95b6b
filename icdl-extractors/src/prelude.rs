pub use crate::extractor::ExtractorThreadHandle;
pub use crate::extractor::QueueFetch;
pub use crate::extractor::ResolveStrategy;

pub use crate::websites::imagechest::ImagechestApi;
pub use crate::websites::imagechest::ImagechestExtractor;
pub use crate::websites::imagechest::ImagechestUserExtractor;

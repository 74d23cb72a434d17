//! Image Classifier Common Library
//!
//! アダプタとUIで共有される型・検証ルール・セッション状態機械

pub mod error;
pub mod types;
pub mod validation;
pub mod preview;
pub mod upload;
pub mod session;
pub mod presentation;
pub mod prompts;
pub mod parser;

pub use error::{BoxError, ClassifyError, UploadRejection};
pub use types::{guess_mime_type, ClassificationResult, FileCandidate, ImageMime, ImagePayload};
pub use validation::{UploadPolicy, ACCEPTED_EXTENSIONS, MAX_UPLOAD_BYTES};
pub use preview::{PreviewRef, PreviewRegistry};
pub use upload::{UploadControl, UploadedImage};
pub use session::{ClassifyTicket, Session, SessionState, NO_IMAGE_MESSAGE};
pub use presentation::{confidence_percent, ConfidenceTier, ResultView};
pub use prompts::{response_schema, CLASSIFY_PROMPT, RESPONSE_MIME_TYPE};
pub use parser::{extract_json, parse_classification};

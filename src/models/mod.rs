pub mod attachments;
pub mod cases;
pub mod conversations;
pub mod messages;
pub mod users;

pub use attachments::AttachmentDescriptor;
pub use cases::{CaseRow, CaseStatus};
pub use conversations::{ConversationRow, ConversationStatus, ConversationSummaryRow, PendingRequestRow};
pub use messages::MessageRow;
pub use users::{LawyerRow, Role, UsersRow};

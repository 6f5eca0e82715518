pub mod attachments;
pub mod auth;
pub mod cases;
pub mod conversations;
pub mod health;
pub mod lawyers;
pub mod messages;
pub mod requests;

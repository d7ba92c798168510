//! Core data types shared across the crate.

pub mod capability;
pub mod message;

pub use capability::{
    PromptArgumentDescriptor, PromptContent, PromptDescriptor, PromptMessage, PromptPart,
    ResourceContent, ToolCallOutcome, ToolDescriptor,
};
pub use message::{ContentBlock, Message, Role};

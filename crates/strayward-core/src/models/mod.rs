//! Data models for the dog-rescue service.
//!
//! This module contains the request and response bodies exchanged with
//! the remote API:
//!
//! - `CurrentUser`, `ProfileUpdate`, `TokenPair`: accounts and sessions
//! - `Dog`, `DogSummary`, `DogImage`, `DogStatus`: stray dog reports
//! - `MessageResponse`, `UploadReceipt`: acknowledgement bodies

pub mod dog;
pub mod user;

pub use dog::{
    Dog, DogFilter, DogImage, DogImageInfo, DogStatus, DogSummary, DogUpdate, NewDog,
    UploadReceipt, UserRef,
};
pub use user::{
    CurrentUser, LoginRequest, MessageResponse, ProfileUpdate, RefreshRequest, SignupRequest,
    TokenPair,
};

//! # PolicyNav account service
//!
//! `policynav` is the credential and session backend for the PolicyNav chat
//! application. It owns a single-file SQLite store of accounts and exposes
//! the account lifecycle over HTTP:
//!
//! - **Signup / login** — Argon2id password digests, never plaintext.
//! - **Password recovery** — security-question flow; a successful answer
//!   mints a short-lived, single-use reset ticket, and ticket redemption and
//!   the password overwrite commit in one transaction.
//! - **Sessions** — stateless HS256 bearer tokens carrying
//!   {subject email, display username, expiry}. No server-side blacklist;
//!   expiry is the only revocation.
//!
//! The chat reply generator is a pluggable collaborator behind
//! [`chat::ReplyGenerator`]; the bundled implementation echoes the canned
//! demo response.

pub mod api;
pub mod auth;
pub mod chat;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub mod capacity;
pub mod captcha;
pub mod credentials;
pub mod db;
pub mod email;
pub mod error;
pub mod stage;
pub mod token;
pub mod validation;
pub mod web;

pub mod geo;
pub mod jwt;
pub mod marshal_code;
pub mod password;
pub mod transitions;

//! Concrete collaborators: the station API, local payload files and S3.

pub mod file;
pub mod realmfive;
pub mod s3;

pub use file::FileSource;
pub use realmfive::RealmFiveClient;
pub use s3::S3Publisher;

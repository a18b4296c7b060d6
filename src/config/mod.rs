mod lists;
mod upload_config;

pub use lists::split_list;

pub use upload_config::{
    UploadConfig,
    load_config,
};

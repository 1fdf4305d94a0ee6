use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to build the HTTP request: {0}")]
    RequestBuild(#[from] reqwest::Error),

    #[error("The API request returned an error [{code}]: {description}")]
    ApiError { code: String, description: String },

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),

    #[error("No data returned for '{0}'")]
    NoData(String),

    #[error("Fetched bars do not form a valid series: {0}")]
    InvalidSeries(#[from] core_types::CoreError),
}

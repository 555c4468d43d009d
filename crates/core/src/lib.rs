mod apply;
mod classifier;
mod config;
mod discovery;
mod error;
mod exif_reader;
mod metadata;
mod naming;
mod paths;

#[cfg(test)]
mod fixtures;

pub use apply::{
    list_candidates, move_candidates, rename_candidates, ActionSummary, ConflictPolicy,
    RunOptions,
};
pub use classifier::{lower_case_extension, ExtensionClassifier, DEFAULT_EXTENSIONS};
pub use config::{
    app_paths, load_config, load_config_from, save_config, save_config_to, AppConfig, AppPaths,
};
pub use discovery::{
    find_candidates, scan, DiscoveryOptions, ExtractionPolicy, Filtration, Scan, TraversalMode,
};
pub use error::{ArgumentError, ConflictError, ExtractError};
pub use exif_reader::extract_taken_time;
pub use metadata::{parse_local_timestamp, Candidate, TimeRange, RANGE_TIMESTAMP_FORMAT};
pub use naming::{derive_path, suffixed_path, NAME_FORMAT};

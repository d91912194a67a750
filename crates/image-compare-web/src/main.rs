#![warn(missing_docs)]
//! # image-compare-web binary
//!
//! Native diagnostic entry point. The page itself runs from the wasm build of
//! the library; this prints the version and the configuration a deployment
//! would resolve from `IMAGE_COMPARE_*` variables.

/// CLI entry point.
fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        env_logger::init();

        println!("image-compare-web {}", image_compare_web::app_version());
        match image_compare_web::config_from_env() {
            Ok(config) => {
                println!("endpoint={} (IMAGE_COMPARE_ENDPOINT)", config.endpoint);
                println!(
                    "upload_policy={} (IMAGE_COMPARE_UPLOAD_POLICY)",
                    config.upload_policy.name()
                );
            }
            Err(error) => {
                log::error!("startup | config | {error}");
                eprintln!("invalid configuration: {error}");
                std::process::exit(2);
            }
        }
    }
}

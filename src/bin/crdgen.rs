//! Prints the HttpCheck CustomResourceDefinition as YAML
//!
//! ```sh
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use anyhow::Result;
use kube::CustomResourceExt;

use pingdom_operator::crd::HttpCheck;

fn main() -> Result<()> {
    print!("{}", serde_yaml::to_string(&HttpCheck::crd())?);
    Ok(())
}

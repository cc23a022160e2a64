//! Unit tests for CLI argument parsing

use crate::cli::{Cli, Commands};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn test_serve_command_with_flags() {
    let cli = Cli::try_parse_from([
        "swagger-framework",
        "serve",
        "--declarations",
        "petstore",
        "--config",
        "service.yaml",
        "--addr",
        "127.0.0.1:9000",
    ])
    .unwrap();

    assert_eq!(
        cli.command,
        Commands::Serve {
            declarations: PathBuf::from("petstore"),
            config: Some(PathBuf::from("service.yaml")),
            addr: Some("127.0.0.1:9000".to_string()),
        }
    );
}

#[test]
fn test_docs_command_resource_is_optional() {
    let cli = Cli::try_parse_from(["swagger-framework", "docs", "-d", "petstore"]).unwrap();
    match cli.command {
        Commands::Docs {
            declarations,
            resource,
        } => {
            assert_eq!(declarations, PathBuf::from("petstore"));
            assert!(resource.is_none());
        }
        other => panic!("Expected Docs command, got {:?}", other),
    }
}

#[test]
fn test_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["swagger-framework", "generate"]).is_err());
}

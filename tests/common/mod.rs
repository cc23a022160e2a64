#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use swagger_framework::framework::Framework;
use swagger_framework::middleware::{handler, Stage};
use swagger_framework::server::Reply;
use swagger_framework::spec::{load_declarations, FrameworkOptions, OperationSpec};

/// Directory holding the petstore declarations.
pub fn petstore_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/petstore")
}

/// Handler replying with the nickname and every validated parameter location.
pub fn params_handler(op: &OperationSpec) -> Arc<dyn Stage> {
    let nickname = op.nickname.clone();
    handler(move |ctx| {
        Reply::json(
            200,
            json!({
                "nickname": nickname,
                "header": ctx.params.header,
                "path": ctx.params.path,
                "query": ctx.params.query,
                "form": ctx.params.form,
                "body": ctx.params.body,
            }),
        )
        .into()
    })
}

/// The petstore loaded with [`params_handler`] on every operation.
pub fn petstore() -> Framework {
    load_declarations(
        &petstore_dir(),
        Some(FrameworkOptions::new("http://localhost:8080").api_version("1.0.0")),
        params_handler,
    )
    .unwrap()
}

pub fn request(method: &str, uri: &str) -> http::Request<Vec<u8>> {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .body(Vec::new())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> http::Request<Vec<u8>> {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(serde_json::to_vec(&body).unwrap())
        .unwrap()
}

pub fn body_json(resp: &http::Response<Vec<u8>>) -> Value {
    serde_json::from_slice(resp.body()).unwrap()
}

pub mod temp_files {
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A temporary declarations directory; removed on drop.
    pub struct TempDeclarations {
        dir: TempDir,
    }

    impl TempDeclarations {
        pub fn new() -> Self {
            TempDeclarations {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        /// Copy every petstore fixture into the directory.
        pub fn petstore() -> Self {
            let temp = Self::new();
            for entry in std::fs::read_dir(super::petstore_dir()).unwrap() {
                let entry = entry.unwrap();
                std::fs::copy(entry.path(), temp.path().join(entry.file_name())).unwrap();
            }
            temp
        }

        pub fn write(&self, name: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            path
        }

        pub fn path(&self) -> &Path {
            self.dir.path()
        }
    }
}

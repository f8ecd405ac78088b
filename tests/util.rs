//! Shared test utilities for integration tests
//!
//! Builds small Go modules on disk so the pipeline can run end to end
//! without a Go toolchain.

#![allow(dead_code)]

use assert_fs::prelude::*;

/// Module `example.com/test` with sources under `pkg/`:
/// - `foo`: `FooReq{Bar}`, `FooRes{ID}`, `Bar`, interfaces `Transaction`
///   and `Embedded{Transaction}`
/// - `baz`: `Other{Value}`
pub fn make_module_fixture() -> assert_fs::TempDir
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    tmp.child("go.mod")
        .write_str("module example.com/test\n\ngo 1.25.0\n")
        .expect("write go.mod");

    tmp.child("pkg/foo/dto.go")
        .write_str(
            "package foo\n\n\
             // FooReq is sent by clients.\n\
             type FooReq struct {\n\
             \tBar Bar `json:\"bar\"`\n\
             }\n\n\
             type FooRes struct {\n\
             \tID string `json:\"id\"`\n\
             }\n",
        )
        .expect("write dto.go");

    tmp.child("pkg/foo/bar.go")
        .write_str("package foo\n\ntype Bar struct {\n\tName string `json:\"name\"`\n}\n")
        .expect("write bar.go");

    tmp.child("pkg/foo/tx.go")
        .write_str(
            "package foo\n\n\
             type Transaction interface {\n\
             \tCommit() error\n\
             }\n\n\
             type Embedded interface {\n\
             \tTransaction\n\
             }\n",
        )
        .expect("write tx.go");

    tmp.child("pkg/foo/dto_test.go")
        .write_str("package foo\n\ntype OnlyInTests struct{}\n")
        .expect("write dto_test.go");

    tmp.child("pkg/baz/other.go")
        .write_str("package baz\n\ntype Other struct {\n\tValue string `json:\"value\"`\n}\n")
        .expect("write other.go");

    // Never scanned: the generator's own directory and hidden dirs
    tmp.child("pkg/typegen/self.go")
        .write_str("package typegen\n\ntype Internal struct{}\n")
        .expect("write self.go");
    tmp.child("pkg/.cache/x.go")
        .write_str("package cache\n\ntype Cached struct{}\n")
        .expect("write cached");

    tmp
}

/// Root import path of [`make_module_fixture`]'s `pkg/` directory
pub const ROOT_IMPORT_PATH: &str = "example.com/test/pkg";

use std::{path::Path, process::Command};

use retarget::{
    metadata::{
        identity::{AssemblyIdentity, AssemblyVersion},
        signatures::{SignatureMethod, SignatureParameter, TypeSignature},
        token::Token,
        typesystem::{MethodDef, TypeDef},
    },
    ImageStore, Module, ModuleStore, WriteOptions,
};

fn retarget() -> Command {
    Command::new(env!("CARGO_BIN_EXE_retarget"))
}

fn write_module(path: &Path) {
    let mut module = Module::new("Game.dll");
    module
        .assembly_refs
        .push(AssemblyIdentity::new("UnityEngine", AssemblyVersion::default()));
    let mut ty = TypeDef::new(Token::new(0x0200_0002), "Game", "Foo");
    ty.methods.push(MethodDef::internal_call(
        Token::new(0x0600_0001),
        "Tick",
        SignatureMethod::instance(SignatureParameter::value(TypeSignature::Void), vec![]),
    ));
    module.types.push(ty);
    ImageStore::new()
        .save(&module, path, &WriteOptions::preserving())
        .unwrap();
}

#[test]
fn missing_output_directory_fails() {
    let input = tempfile::tempdir().unwrap();
    let status = retarget()
        .arg("--output")
        .arg(input.path().join("does-not-exist"))
        .arg(input.path())
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn per_file_errors_keep_exit_status_zero() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_module(&input.path().join("Managed/Game.dll"));
    std::fs::create_dir_all(output.path().join("Managed")).unwrap();
    std::fs::write(output.path().join("Managed/Game.dll"), b"taken").unwrap();

    let result = retarget()
        .arg("--json")
        .arg("-o")
        .arg(output.path())
        .arg(input.path())
        .output()
        .unwrap();
    assert_eq!(result.status.code(), Some(0));

    let summary: serde_json::Value = serde_json::from_slice(&result.stdout).unwrap();
    assert_eq!(summary["errors"], 1);
    assert_eq!(summary["processed"], 0);
}

#[test]
fn mirrors_input_layout() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_module(&input.path().join("Managed/Game.dll"));

    let status = retarget()
        .arg("--output")
        .arg(output.path())
        .arg("--striptarget=false")
        .arg(input.path())
        .status()
        .unwrap();
    assert!(status.success());

    let module = ImageStore::new()
        .load(&output.path().join("Managed/Game.dll"))
        .unwrap();
    assert!(module.types[0].methods[0].body.is_some());
}

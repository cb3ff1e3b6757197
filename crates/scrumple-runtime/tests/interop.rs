//! ES module interop tests

mod common;

use common::leaf;
use scrumple_runtime::{Bundle, BundleTable, HostModule, ModuleDef, NativeFunction, Value, object};

fn interop_bundle() -> Bundle {
    let table = BundleTable::new()
        .module(
            "/main.js",
            leaf("/main.js")
                .dep("./cjs", "/cjs.js")
                .dep("./esm", "/esm.js"),
        )
        .module(
            "/cjs.js",
            ModuleDef::new("/cjs.js", |scope| {
                scope.exports.set("answer", 42);
                Ok(())
            }),
        )
        .module(
            "/esm.js",
            ModuleDef::new("/esm.js", |scope| {
                scope.exports.set("default", "fallback");
                scope.exports.set("named", 7);
                Ok(())
            })
            .es_module(),
        )
        .main("/main.js")
        .host_fn(|specifier| match specifier {
            "native-esm" => Ok(HostModule::es_module(object! { "default" => "host" })),
            "native-cjs" => Ok(HostModule::new(object! { "readFile" => true })),
            other => anyhow::bail!("no such host module: {other}"),
        });
    Bundle::install(table).unwrap()
}

#[test]
fn test_commonjs_module_is_wrapped() {
    let bundle = interop_bundle();
    let main = bundle.run().unwrap();
    let require = main.require().unwrap();

    let view = require.es_module("./cjs").unwrap();
    assert!(!view.is_native());

    let cjs = bundle.module("/cjs.js").unwrap();
    assert_eq!(view.default_export(), cjs.exports().clone());
    assert_eq!(view.get("default").get("answer"), Value::Number(42.0));
    assert!(view.get("answer").is_undefined());

    let namespace = view.to_value();
    assert_eq!(namespace.get("default"), cjs.exports().clone());
}

#[test]
fn test_es_module_passes_through() {
    let bundle = interop_bundle();
    let main = bundle.run().unwrap();
    let require = main.require().unwrap();

    let view = require.es_module("./esm").unwrap();
    assert!(view.is_native());

    let esm = bundle.module("/esm.js").unwrap();
    assert_eq!(view.to_value(), esm.exports().clone());
    assert_eq!(view.default_export(), Value::from("fallback"));
    assert_eq!(view.get("named"), Value::Number(7.0));
}

#[test]
fn test_host_modules_carry_their_interop_kind() {
    let bundle = interop_bundle();
    let main = bundle.run().unwrap();
    let require = main.require().unwrap();

    let native = require.es_module("native-esm").unwrap();
    assert!(native.is_native());
    assert_eq!(native.default_export(), Value::from("host"));

    let wrapped = require.es_module("native-cjs").unwrap();
    assert!(!wrapped.is_native());
    assert_eq!(wrapped.default_export().get("readFile"), Value::Boolean(true));
}

#[test]
fn test_default_export_tracks_in_progress_module() {
    let table = BundleTable::new()
        .module(
            "/a.js",
            ModuleDef::new("/a.js", |scope| {
                scope.require.require("./b")?;
                scope.exports.set("done", true);
                Ok(())
            })
            .dep("./b", "/b.js"),
        )
        .module(
            "/b.js",
            ModuleDef::new("/b.js", |scope| {
                let a = scope.require.es_module("./a")?;
                scope.exports.set("aDoneDuringCycle", a.default_export().get("done"));
                scope.exports.set("aDefault", a.default_export());
                Ok(())
            })
            .dep("./a", "/a.js"),
        )
        .main("/a.js");
    let bundle = Bundle::install(table).unwrap();
    let a = bundle.run().unwrap();
    let b = bundle.module("/b.js").unwrap();

    assert!(b.exports().get("aDoneDuringCycle").is_undefined());
    let a_default = b.exports().get("aDefault");
    assert_eq!(a_default, a.exports().clone());
    assert_eq!(a_default.get("done"), Value::Boolean(true));
}

#[test]
fn test_function_exports() {
    let table = BundleTable::new()
        .module(
            "/main.js",
            ModuleDef::new("/main.js", |scope| {
                let add = scope.require.require("./add")?;
                let add = add.get("add");
                let sum = add
                    .as_function()
                    .ok_or_else(|| anyhow::anyhow!("add is not a function"))?
                    .call(&[Value::from(2), Value::from(3)])?;
                scope.exports.set("sum", sum);
                Ok(())
            })
            .dep("./add", "/add.js"),
        )
        .module(
            "/add.js",
            ModuleDef::new("/add.js", |scope| {
                let add = NativeFunction::new("add", |args| {
                    let total: f64 = args.iter().filter_map(Value::as_number).sum();
                    Ok(Value::from(total))
                });
                scope.exports.set("add", add);
                Ok(())
            }),
        )
        .main("/main.js");
    let bundle = Bundle::install(table).unwrap();
    let exports = bundle.exports().unwrap();

    assert_eq!(exports.get("sum"), Value::Number(5.0));
    let add = bundle.module("/add.js").unwrap().exports().get("add");
    assert_eq!(add.type_of(), "function");
    assert_eq!(add.as_function().unwrap().name(), "add");
}

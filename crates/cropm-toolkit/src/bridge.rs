//! JSON-over-stdio bridge to a Python interpreter.
//!
//! Each operation runs one short Python script with `python -c`. The request
//! is written to the script's stdin as JSON and the script prints its result
//! as JSON on stdout. A non-zero exit is a failure whose message is the last
//! line of stderr (the exception line of a Python traceback); the whole
//! traceback is logged.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::ToolkitError;

/// Parses a package and prints its models in the typed description schema.
///
/// Optional attributes are resolved here, once, so the Rust side never has to
/// probe for them.
pub const PARSE_SCRIPT: &str = r#"
import json, sys
from pycropml import pparse

def text(value):
    return "" if value is None else str(value)

def optional(obj, attr):
    value = getattr(obj, attr, None)
    if value is None or str(value) == "":
        return None
    return str(value)

def items(obj, attr):
    return getattr(obj, attr, None) or []

def variable(var):
    category = getattr(var, "variablecategory", None)
    if category is None:
        category = getattr(var, "parametercategory", "")
    return {
        "name": text(var.name),
        "description": text(getattr(var, "description", "")),
        "inputtype": text(getattr(var, "inputtype", "")),
        "category": text(category),
        "datatype": text(getattr(var, "datatype", "")),
        "unit": text(getattr(var, "unit", "")),
        "len": optional(var, "len"),
        "default": optional(var, "default"),
        "min": optional(var, "min"),
        "max": optional(var, "max"),
        "uri": optional(var, "uri"),
    }

def named(values):
    return [{"name": text(v.name), "value": text(getattr(v, "value", ""))} for v in values]

def expected(values):
    return [
        {"name": text(v.name), "value": text(getattr(v, "value", "")), "precision": optional(v, "precision")}
        for v in values
    ]

def model(m):
    d = m.description
    return {
        "name": text(m.name),
        "modelid": text(getattr(m, "modelid", "")),
        "version": text(getattr(m, "version", "")),
        "timestep": text(getattr(m, "timestep", "")),
        "description": {
            "title": text(getattr(d, "Title", "")),
            "authors": text(getattr(d, "Authors", "")),
            "institution": text(getattr(d, "Institution", "")),
            "reference": text(getattr(d, "Reference", "")),
            "extended_description": text(getattr(d, "ExtendedDescription", "")),
        },
        "inputs": [variable(v) for v in items(m, "inputs")],
        "outputs": [variable(v) for v in items(m, "outputs")],
        "functions": [
            {"filename": text(f.filename), "type": text(getattr(f, "type", ""))}
            for f in items(m, "function")
        ],
        "parametersets": [
            {"name": text(p.name), "description": text(getattr(p, "description", "")), "params": named(items(p, "params"))}
            for p in items(m, "parametersets")
        ],
        "testsets": [
            {
                "name": text(t.name),
                "description": text(getattr(t, "description", "")),
                "parameterset": text(getattr(t, "parameterset", "")),
                "tests": [
                    {"name": text(c.name), "inputs": named(items(c, "inputs")), "outputs": expected(items(c, "outputs"))}
                    for c in items(t, "tests")
                ],
            }
            for t in items(m, "testsets")
        ],
    }

request = json.load(sys.stdin)
json.dump([model(m) for m in pparse.model_parser(request["package"])], sys.stdout)
"#;

/// Writes a unit or composition model with the legacy XML writers.
pub const WRITE_SCRIPT: &str = r#"
import importlib, json, sys

request = json.load(sys.stdin)
writers = importlib.import_module(request["writer_module"])
draft = request["draft"]
h = draft["datas"]
datas = {
    "Path": h["packageName"],
    "Model type": h["modelType"],
    "Model name": h["modelName"],
    "Model ID": h["modelID"],
    "Version": h["version"],
    "Timestep": h["timestep"],
    "Title": h["title"],
    "Authors": h["authors"],
    "Institution": h["institution"],
    "Reference": h["reference"],
    "ExtendedDescription": h["description"],
}
if request["kind"] == "unit":
    writer = writers.writeunitXML(
        datas=datas,
        df=draft["df"],
        paramsetdict=draft["paramsetdict"],
        testsetdict=draft["testsetdict"],
        iscreate=True,
        local=False,
    )
    writer._write()
else:
    writer = writers.writecompositionXML(
        data=datas,
        listmodel=draft["listmodel"],
        listlink=draft["listlink"],
        iscreate=True,
    )
    writer.write()
json.dump(None, sys.stdout)
"#;

/// Runs the cyml transpiler for one target.
pub const TRANSPILE_SCRIPT: &str = r#"
import json, sys
from pycropml.cyml import transpile_package, transpile_component

request = json.load(sys.stdin)
if request["mode"] == "package":
    transpile_package(request["package"], request["target"])
else:
    transpile_component(request["package"], request["output"], request["target"])
json.dump(None, sys.stdout)
"#;

/// Renders the workflow SVG; bytes are returned base64-encoded.
pub const TOPOLOGY_SCRIPT: &str = r#"
import base64, json, sys
from pycropml.topology import Topology

request = json.load(sys.stdin)
data = Topology(request["name"], pkg=request["package"]).get_wf_svg()
if isinstance(data, bytes):
    json.dump({"kind": "bytes", "data": base64.b64encode(data).decode("ascii")}, sys.stdout)
elif isinstance(data, str):
    json.dump({"kind": "text", "data": data}, sys.stdout)
else:
    raise ValueError("Unexpected image data type: %s" % type(data))
"#;

/// A Python interpreter that runs bridge scripts.
#[derive(Debug, Clone)]
pub struct PythonBridge {
    python: PathBuf,
    working_dir: Option<PathBuf>,
}

impl PythonBridge {
    pub fn new(python: impl Into<PathBuf>) -> Self {
        PythonBridge {
            python: python.into(),
            working_dir: None,
        }
    }

    /// Runs scripts from `dir` instead of the current directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn python(&self) -> &Path {
        &self.python
    }

    /// Runs `script` with `input` on stdin and decodes its stdout.
    pub fn run<I, T>(&self, operation: &str, script: &str, input: &I) -> Result<T, ToolkitError>
    where
        I: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(input)
            .map_err(|e| ToolkitError::failed(operation, format!("cannot encode request: {e}")))?;

        debug!(operation, bytes = payload.len(), "running python bridge");

        let mut command = Command::new(&self.python);
        command
            .args(["-c", script])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| ToolkitError::Spawn {
            program: self.python.display().to_string(),
            source,
        })?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&payload)?;
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(operation, status = %output.status, traceback = %stderr, "python bridge failed");
            return Err(ToolkitError::failed(operation, last_line(&stderr, output.status)));
        }

        serde_json::from_slice(&output.stdout).map_err(|source| ToolkitError::InvalidOutput {
            operation: operation.to_string(),
            source,
        })
    }
}

/// Last non-empty stderr line, or the exit status when stderr is empty.
pub(crate) fn last_line(stderr: &str, status: std::process::ExitStatus) -> String {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("exited with {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_interpreter_is_a_spawn_error() {
        let bridge = PythonBridge::new("/nonexistent/python-for-cropm-tests");
        let err = bridge
            .run::<_, serde_json::Value>("parse", PARSE_SCRIPT, &serde_json::json!({}))
            .unwrap_err();
        assert!(matches!(err, ToolkitError::Spawn { .. }));
    }

    #[test]
    fn scripts_read_their_request_from_stdin() {
        for script in [PARSE_SCRIPT, WRITE_SCRIPT, TRANSPILE_SCRIPT, TOPOLOGY_SCRIPT] {
            assert!(script.contains("json.load(sys.stdin)"));
        }
    }
}

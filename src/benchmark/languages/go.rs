//! Go language handler

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    benchmark::harness::HarnessRequest,
    constants::file_extensions,
    models::{InputType, Language},
};

use super::{fill_template, Execution, LanguageHandler};

/// Handler for Go
pub static HANDLER: LanguageHandler = LanguageHandler {
    language: Language::Go,
    display_name: "Go",
    source_extension: file_extensions::GO,
    execution: Execution::Interpret { args: &["run"] },
    version_args: &["version"],
    function_pattern: r"func\s+(\w+)\s*\(",
    skips_main: true,
    memory_probe: "runtime.MemStats.Alloc after GC",
    temp_dir_vars: &["GOTMPDIR"],
    render,
};

static PACKAGE_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*package[ \t]+\w+[ \t]*;?[ \t]*$").expect("valid package regex")
});

// Harness imports are aliased so user code may import the same packages.
const BASE_IMPORTS: &[&str] = &[
    "__benchSha256 \"crypto/sha256\"",
    "__benchFmt \"fmt\"",
    "__benchOs \"os\"",
    "__benchReflect \"reflect\"",
    "__benchRuntime \"runtime\"",
    "__benchTime \"time\"",
];

const RAND_IMPORT: &str = "__benchRand \"math/rand\"";

const TEMPLATE: &str = r#"package main

import (
{imports}
)

{code}

func main() {
	__benchInput := {input}

	var __benchOutput []__benchReflect.Value
	if __benchErr := __benchProtect(func() {
		__benchOutput = __benchReflect.ValueOf({function}).Call([]__benchReflect.Value{__benchReflect.ValueOf(__benchInput)})
	}); __benchErr != nil {
		__benchFmt.Fprintln(__benchOs.Stderr, "ERROR:", __benchErr)
		__benchOs.Exit(1)
	}

	__benchSamples := make([]float64, 0, {runs})
	for __benchRun := 0; __benchRun < {runs}; __benchRun++ {
		__benchStart := __benchTime.Now()
		{function}(__benchInput)
		__benchSamples = append(__benchSamples, float64(__benchTime.Since(__benchStart).Nanoseconds())/1e6)
	}

	var __benchMem __benchRuntime.MemStats
	__benchRuntime.GC()
	{function}(__benchInput)
	__benchRuntime.ReadMemStats(&__benchMem)

	__benchTotal := 0.0
	for _, __benchSample := range __benchSamples {
		__benchTotal += __benchSample
		__benchFmt.Printf("SAMPLE:%f\n", __benchSample)
	}
	__benchFmt.Printf("TIME:%f\n", __benchTotal/float64(len(__benchSamples)))
	__benchFmt.Printf("MEMORY:%d\n", __benchMem.Alloc)
	__benchFmt.Printf("OUTPUT:%s\n", __benchDigest(__benchOutput))
	__benchFmt.Println("SUCCESS")
}

// Go-syntax rendering; fmt prints map keys in sorted order.
func __benchDigest(values []__benchReflect.Value) string {
	__benchHash := __benchSha256.New()
	for _, __benchValue := range values {
		__benchFmt.Fprintf(__benchHash, "%#v\x1f", __benchValue.Interface())
	}
	return __benchFmt.Sprintf("%x", __benchHash.Sum(nil))
}

func __benchProtect(call func()) (err error) {
	defer func() {
		if recovered := recover(); recovered != nil {
			err = __benchFmt.Errorf("%v", recovered)
		}
	}()
	call()
	return nil
}
"#;

fn render(request: &HarnessRequest<'_>) -> String {
    let imports = imports(request.input_type);
    let input = input_expression(request.input_size, request.input_type);
    let runs = request.runs.to_string();
    let code = strip_package_clause(request.code);

    fill_template(
        TEMPLATE,
        &[
            ("imports", &imports),
            ("input", &input),
            ("function", request.function_name),
            ("runs", &runs),
        ],
        &code,
    )
}

fn imports(input_type: InputType) -> String {
    let mut lines: Vec<&str> = BASE_IMPORTS.to_vec();
    if input_type == InputType::RandomArray {
        lines.push(RAND_IMPORT);
    }
    lines
        .iter()
        .map(|line| format!("\t{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The harness owns `package main`; drop the user's package clause.
fn strip_package_clause(code: &str) -> String {
    PACKAGE_CLAUSE.replace_all(code, "").into_owned()
}

/// Go expression producing the benchmark input
fn input_expression(size: usize, input_type: InputType) -> String {
    match input_type {
        InputType::Array => format!(
            "func() []int {{ s := make([]int, {size}); for i := range s {{ s[i] = i }}; return s }}()"
        ),
        InputType::RandomArray => format!(
            "func() []int {{ r := __benchRand.New(__benchRand.NewSource({size})); s := make([]int, {size}); \
             for i := range s {{ s[i] = r.Intn({size} + 1) }}; return s }}()"
        ),
        InputType::String => format!(
            "func() string {{ b := make([]byte, {size}); for i := range b {{ b[i] = 'a' }}; return string(b) }}()"
        ),
        InputType::Map => format!(
            "func() map[int]int {{ m := make(map[int]int, {size}); for i := 0; i < {size}; i++ {{ m[i] = i }}; return m }}()"
        ),
    }
}

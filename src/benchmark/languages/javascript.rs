//! JavaScript and TypeScript language handler
//!
//! Both run on Node.js. TypeScript sources go through the same harness, so
//! they must be type-annotation free (plain JavaScript that is also valid
//! TypeScript).

use crate::{
    benchmark::harness::HarnessRequest,
    constants::file_extensions,
    models::{InputType, Language},
};

use super::{fill_template, Execution, LanguageHandler};

const FUNCTION_PATTERN: &str = r"(?:function\s+(\w+)|(?:const|let|var)\s+(\w+)\s*=)";

/// Handler for JavaScript
pub static HANDLER: LanguageHandler = LanguageHandler {
    language: Language::JavaScript,
    display_name: "JavaScript",
    source_extension: file_extensions::JAVASCRIPT,
    execution: Execution::Interpret { args: &[] },
    version_args: &["--version"],
    function_pattern: FUNCTION_PATTERN,
    skips_main: false,
    memory_probe: "heapUsed delta",
    temp_dir_vars: &[],
    render,
};

/// Handler for TypeScript
pub static TYPESCRIPT_HANDLER: LanguageHandler = LanguageHandler {
    language: Language::TypeScript,
    display_name: "TypeScript",
    source_extension: file_extensions::JAVASCRIPT,
    execution: Execution::Interpret { args: &[] },
    version_args: &["--version"],
    function_pattern: FUNCTION_PATTERN,
    skips_main: false,
    memory_probe: "heapUsed delta",
    temp_dir_vars: &[],
    render,
};

const TEMPLATE: &str = r#"const { performance: __benchPerformance } = require('perf_hooks');
const { createHash: __benchCreateHash } = require('crypto');
const { inspect: __benchInspect } = require('util');

{code}

function __benchDigest(value) {
    try {
        const text = __benchInspect(value, {
            depth: null,
            sorted: true,
            maxArrayLength: null,
            maxStringLength: null,
            breakLength: Infinity,
            compact: true,
        });
        return __benchCreateHash('sha256').update(text).digest('hex');
    } catch (__benchError) {
        return null;
    }
}

function __benchMain() {
    const __benchInput = {input};

    let __benchOutput;
    try {
        __benchOutput = {function}(__benchInput);
    } catch (__benchError) {
        const __benchMessage = __benchError && __benchError.message ? __benchError.message : String(__benchError);
        console.error('ERROR: ' + __benchMessage);
        process.exit(1);
    }

    const __benchSamples = [];
    for (let __benchRun = 0; __benchRun < {runs}; __benchRun++) {
        const __benchStart = __benchPerformance.now();
        {function}(__benchInput);
        __benchSamples.push(__benchPerformance.now() - __benchStart);
    }

    const __benchHeapBefore = process.memoryUsage().heapUsed;
    {function}(__benchInput);
    const __benchHeapAfter = process.memoryUsage().heapUsed;

    for (const __benchSample of __benchSamples) {
        console.log('SAMPLE:' + __benchSample);
    }
    const __benchTotal = __benchSamples.reduce((a, b) => a + b, 0);
    console.log('TIME:' + (__benchTotal / __benchSamples.length));
    console.log('MEMORY:' + Math.max(0, __benchHeapAfter - __benchHeapBefore));
    const __benchOutputDigest = __benchDigest(__benchOutput);
    if (__benchOutputDigest !== null) {
        console.log('OUTPUT:' + __benchOutputDigest);
    }
    console.log('SUCCESS');
}

__benchMain();
"#;

fn render(request: &HarnessRequest<'_>) -> String {
    let input = input_expression(request.input_size, request.input_type);
    let runs = request.runs.to_string();

    fill_template(
        TEMPLATE,
        &[
            ("input", &input),
            ("function", request.function_name),
            ("runs", &runs),
        ],
        request.code,
    )
}

/// JavaScript expression producing the benchmark input
fn input_expression(size: usize, input_type: InputType) -> String {
    match input_type {
        InputType::Array => format!("Array.from({{length: {size}}}, (_, i) => i)"),
        // mulberry32 seeded with the size
        InputType::RandomArray => format!(
            "((seed) => {{ let a = seed >>> 0; const next = () => {{ a = (a + 0x6D2B79F5) >>> 0; \
             let t = a; t = Math.imul(t ^ (t >>> 15), t | 1); t ^= t + Math.imul(t ^ (t >>> 7), t | 61); \
             return ((t ^ (t >>> 14)) >>> 0) / 4294967296; }}; \
             return Array.from({{length: {size}}}, () => Math.floor(next() * ({size} + 1))); }})({size})"
        ),
        InputType::String => format!("'a'.repeat({size})"),
        InputType::Map => format!(
            "Object.fromEntries(Array.from({{length: {size}}}, (_, i) => [i, i]))"
        ),
    }
}

//! Python language handler

use crate::{
    benchmark::harness::HarnessRequest,
    constants::file_extensions,
    models::{InputType, Language},
};

use super::{fill_template, Execution, LanguageHandler};

/// Handler for Python
pub static HANDLER: LanguageHandler = LanguageHandler {
    language: Language::Python,
    display_name: "Python",
    source_extension: file_extensions::PYTHON,
    execution: Execution::Interpret { args: &[] },
    version_args: &["--version"],
    function_pattern: r"def\s+(\w+)\s*\(",
    skips_main: false,
    memory_probe: "tracemalloc peak bytes",
    temp_dir_vars: &[],
    render,
};

const TEMPLATE: &str = r#"import hashlib as __bench_hashlib
import random as __bench_random
import sys as __bench_sys
import time as __bench_time
import tracemalloc as __bench_tracemalloc

{code}


def __bench_canonical(value):
    if isinstance(value, dict):
        items = sorted((__bench_canonical(k), __bench_canonical(v)) for k, v in value.items())
        return "{" + ", ".join(k + ": " + v for k, v in items) + "}"
    if isinstance(value, (set, frozenset)):
        return "set(" + ", ".join(sorted(__bench_canonical(v) for v in value)) + ")"
    if isinstance(value, (list, tuple)):
        return "[" + ", ".join(__bench_canonical(v) for v in value) + "]"
    return repr(value)


def __bench_digest(value):
    try:
        return __bench_hashlib.sha256(__bench_canonical(value).encode()).hexdigest()
    except Exception:
        return None


def __bench_main():
    __bench_input = {input}

    try:
        __bench_output = {function}(__bench_input)
    except Exception as __bench_error:
        print("ERROR: " + str(__bench_error), file=__bench_sys.stderr)
        __bench_sys.exit(1)

    __bench_samples = []
    for _ in range({runs}):
        __bench_start = __bench_time.perf_counter()
        {function}(__bench_input)
        __bench_samples.append((__bench_time.perf_counter() - __bench_start) * 1000)

    __bench_tracemalloc.start()
    {function}(__bench_input)
    _, __bench_peak = __bench_tracemalloc.get_traced_memory()
    __bench_tracemalloc.stop()

    for __bench_sample in __bench_samples:
        print("SAMPLE:" + repr(__bench_sample))
    print("TIME:" + repr(sum(__bench_samples) / len(__bench_samples)))
    print("MEMORY:" + str(__bench_peak))
    __bench_digest_value = __bench_digest(__bench_output)
    if __bench_digest_value is not None:
        print("OUTPUT:" + __bench_digest_value)
    print("SUCCESS")


if __name__ == "__main__":
    __bench_main()
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

/// Python expression producing the benchmark input
fn input_expression(size: usize, input_type: InputType) -> String {
    match input_type {
        InputType::Array => format!("list(range({size}))"),
        InputType::RandomArray => format!(
            "(lambda __rng: [__rng.randint(0, {size}) for _ in range({size})])(__bench_random.Random({size}))"
        ),
        InputType::String => format!("'a' * {size}"),
        InputType::Map => format!("{{i: i for i in range({size})}}"),
    }
}

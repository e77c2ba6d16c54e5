//! Rust language handler

use crate::{
    benchmark::harness::HarnessRequest,
    constants::file_extensions,
    models::{InputType, Language},
};

use super::{fill_template, Execution, LanguageHandler};

/// Handler for Rust
pub static HANDLER: LanguageHandler = LanguageHandler {
    language: Language::Rust,
    display_name: "Rust",
    source_extension: file_extensions::RUST,
    execution: Execution::Compile {
        args: &["-O", "--edition", "2021"],
    },
    version_args: &["--version"],
    function_pattern: r"fn\s+(\w+)\s*[<(]",
    skips_main: true,
    memory_probe: "not measured (reports 0)",
    temp_dir_vars: &[],
    render,
};

// Return values are digested through their Debug output when they have one;
// `(&__BenchOutput(&value)).__bench_digest()` falls back to the opaque impl.
const TEMPLATE: &str = r#"#![allow(dead_code, unused_imports, unused_variables, unused_mut, non_camel_case_types, non_snake_case)]

{code}

struct __BenchOutput<'a, T>(&'a T);

trait __BenchDebugDigest {
    fn __bench_digest(&self) -> Option<u64>;
}

impl<T: ::std::fmt::Debug> __BenchDebugDigest for __BenchOutput<'_, T> {
    fn __bench_digest(&self) -> Option<u64> {
        use ::std::hash::{Hash, Hasher};
        let mut __bench_hasher = ::std::collections::hash_map::DefaultHasher::new();
        format!("{:?}", self.0).hash(&mut __bench_hasher);
        Some(__bench_hasher.finish())
    }
}

trait __BenchOpaqueDigest {
    fn __bench_digest(&self) -> Option<u64>;
}

impl<T> __BenchOpaqueDigest for &__BenchOutput<'_, T> {
    fn __bench_digest(&self) -> Option<u64> {
        None
    }
}

fn main() {
    let __bench_input = {input};

    let __bench_warmup = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| {
        {function}(&__bench_input)
    }));
    let __bench_output = match __bench_warmup {
        Ok(__bench_output) => __bench_output,
        Err(_) => {
            eprintln!("ERROR: warm-up invocation panicked");
            ::std::process::exit(1);
        }
    };

    let mut __bench_samples: Vec<f64> = Vec::with_capacity({runs});
    for _ in 0..{runs} {
        let __bench_start = ::std::time::Instant::now();
        ::std::hint::black_box({function}(::std::hint::black_box(&__bench_input)));
        __bench_samples.push(__bench_start.elapsed().as_secs_f64() * 1000.0);
    }

    ::std::hint::black_box({function}(&__bench_input));

    for __bench_sample in &__bench_samples {
        println!("SAMPLE:{}", __bench_sample);
    }
    let __bench_total: f64 = __bench_samples.iter().sum();
    println!("TIME:{}", __bench_total / __bench_samples.len() as f64);
    println!("MEMORY:0");
    if let Some(__bench_digest) = (&__BenchOutput(&__bench_output)).__bench_digest() {
        println!("OUTPUT:{:016x}", __bench_digest);
    }
    println!("SUCCESS");
}
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

/// Rust expression producing the benchmark input
fn input_expression(size: usize, input_type: InputType) -> String {
    match input_type {
        InputType::Array => format!("(0..{size}).collect::<Vec<i32>>()"),
        // xorshift64 seeded with the size
        InputType::RandomArray => format!(
            "{{ let mut state: u64 = {size}u64 ^ 0x9E37_79B9_7F4A_7C15; (0..{size}).map(|_| {{ \
             state ^= state << 13; state ^= state >> 7; state ^= state << 17; \
             (state % ({size}u64 + 1)) as i32 }}).collect::<Vec<i32>>() }}"
        ),
        InputType::String => format!("\"a\".repeat({size})"),
        InputType::Map => format!(
            "(0..{size}).map(|i| (i, i)).collect::<::std::collections::HashMap<i32, i32>>()"
        ),
    }
}

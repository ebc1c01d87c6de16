//! Benchmarks for lexing and parsing protobuf schemas.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use protoparse::parser::lexer::Lexer;
use protoparse::parser::{parse_file, parse_message};

const SCHEMA: &str = r#"
syntax = "proto3";

package bench.example;

import "google/protobuf/timestamp.proto";

option java_package = "com.example.bench";

// A person in the address book.
message Person {
  // Display name.
  string name = 1;
  int32 id = 2;
  string email = 3 [deprecated = true];

  enum PhoneType {
    MOBILE = 0;
    HOME = 1;
    WORK = 2;
  }

  message PhoneNumber {
    string number = 1;
    PhoneType type = 2;
  }

  repeated PhoneNumber phones = 4;
  map<string, string> labels = 5;

  oneof contact {
    string slack = 6;
    string matrix = 7;
  }

  reserved 8, 9 to 11, "legacy";
}

service AddressBook {
  // Look up a person.
  rpc Get(Person) returns (Person);
  rpc Watch(stream Person) returns (stream Person) {
    option deprecated = true;
  }
}
"#;

/// A file made of `n` copies of the schema's message, with distinct names.
fn large_schema(n: usize) -> String {
    let start = SCHEMA.find("// A person").unwrap_or(0);
    let end = SCHEMA.find("service").unwrap_or(SCHEMA.len());
    let message = &SCHEMA[start..end];
    let mut out = String::from("syntax = \"proto3\";\n");
    for i in 0..n {
        out.push_str(&message.replace("message Person", &format!("message Person{i}")));
    }
    out
}

/// Messages nested `depth` levels deep.
fn nested_schema(depth: usize) -> String {
    let mut out = String::new();
    for i in 0..depth {
        out.push_str(&format!("message M{i} {{ int32 f{i} = 1; "));
    }
    out.push_str(&"}".repeat(depth));
    out
}

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");
    group.throughput(Throughput::Bytes(SCHEMA.len() as u64));
    group.bench_function("tokenize", |b| {
        b.iter(|| Lexer::new(black_box(SCHEMA)).count())
    });
    group.finish();
}

fn bench_parse_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_file");
    for n in [1usize, 10, 100] {
        let input = large_schema(n);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &input, |b, input| {
            b.iter(|| parse_file(black_box(input)).unwrap())
        });
    }
    group.finish();
}

fn bench_nesting(c: &mut Criterion) {
    let mut group = c.benchmark_group("nesting");
    for depth in [8usize, 32, 60] {
        let input = nested_schema(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &input, |b, input| {
            b.iter(|| parse_message(black_box(input)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lexer, bench_parse_file, bench_nesting);
criterion_main!(benches);

//! Benchmarks for the Reflector tokenizer.
//!
//! Run with: `cargo bench --package reflector_syntax`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use reflector_syntax::{Lexer, TokenStream, format_comment_for_tooltip};

const HEADER: &str = r#"
#pragma once

#include "CoreMinimal.h"
#include "Combatant.generated.h"

/** Something that can take part in a fight. */
UCLASS(Blueprintable, BlueprintType)
class ACombatant : public AActor
{
    GENERATED_BODY()

public:
    /** Current hit points. */
    UPROPERTY(EditAnywhere, BlueprintReadWrite, Category="Combat", meta=(ClampMin="0"))
    float Health = 100.f;

    /** Inventory keyed by slot. */
    UPROPERTY(VisibleAnywhere, Category="Combat")
    TMap<FName, TArray<int32>> Slots;

    /** Applies damage. @param Amount how much */
    UFUNCTION(BlueprintCallable, Category="Combat")
    void ApplyDamage(float Amount);
};
"#;

// =============================================================================
// Lexer Benchmarks
// =============================================================================

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");

    group.throughput(Throughput::Bytes(HEADER.len() as u64));
    group.bench_with_input(BenchmarkId::new("header", HEADER.len()), HEADER, |b, s| {
        b.iter(|| Lexer::tokenize_all(black_box(s)));
    });

    let repeated = HEADER.repeat(50);
    group.throughput(Throughput::Bytes(repeated.len() as u64));
    group.bench_with_input(
        BenchmarkId::new("header_x50", repeated.len()),
        repeated.as_str(),
        |b, s| b.iter(|| Lexer::tokenize_all(black_box(s))),
    );

    group.finish();
}

// =============================================================================
// Stream Benchmarks
// =============================================================================

fn bench_stream(c: &mut Criterion) {
    c.bench_function("stream_peek_and_consume", |b| {
        b.iter(|| {
            let mut stream = TokenStream::new(Lexer::new(black_box(HEADER)));
            let mut count = 0usize;
            while !stream.is_eof() {
                if stream.match_symbol("(") {
                    count += 1;
                } else {
                    stream.get_token();
                }
            }
            count
        });
    });
}

// =============================================================================
// Comment Benchmarks
// =============================================================================

fn bench_comment(c: &mut Criterion) {
    let raw = "/**\n * Applies damage to the combatant.\n *\n * @param Amount how much\n * @param Source who dealt it\n */";
    c.bench_function("format_comment_for_tooltip", |b| {
        b.iter(|| format_comment_for_tooltip(black_box(raw)));
    });
}

criterion_group!(benches, bench_lexer, bench_stream, bench_comment);
criterion_main!(benches);

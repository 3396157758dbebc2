//! Benchmarks for header parsing and module resolution.
//!
//! Run with: `cargo bench --package reflector_parser`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use reflector_foundation::ParserConfig;
use reflector_parser::{Session, parse_header, parse_module, prescan};

fn combatant(index: usize) -> String {
    format!(
        r#"#include "Combatant{index}.generated.h"

DECLARE_DYNAMIC_MULTICAST_DELEGATE_OneParam(FOnHealthChanged{index}, float, NewHealth);

/** Element a combatant is attuned to. */
UENUM(BlueprintType)
enum class EElement{index} : uint8
{{
    Fire,
    Water UMETA(DisplayName = "Aqua"),
    Earth
}};

/** Loot dropped on death. */
USTRUCT(BlueprintType)
struct FLoot{index}
{{
    GENERATED_BODY()

    UPROPERTY(EditAnywhere, BlueprintReadWrite)
    int32 Gold;

    UPROPERTY(EditAnywhere)
    TArray<float> Weights;
}};

/** Something that can take part in a fight. */
UCLASS()
class ACombatant{index} : public AActor
{{
    GENERATED_BODY()

public:
    UPROPERTY(EditAnywhere, BlueprintReadWrite, Category = "Combat", meta = (ClampMin = "0"))
    float Health;

    UPROPERTY(EditAnywhere, Category = "Combat")
    EElement{index} Element;

    UPROPERTY(BlueprintAssignable, Category = "Combat")
    FOnHealthChanged{index} OnHealthChanged;

    /** Applies damage. */
    UFUNCTION(BlueprintCallable, Category = "Combat")
    void ApplyDamage(float Amount, const FLoot{index}& Drop);

    UFUNCTION(BlueprintCallable, Category = "Combat")
    float GetHealth() const {{ return Health; }}
}};
"#
    )
}

fn chain(length: usize) -> Vec<(String, String)> {
    (0..length)
        .map(|i| {
            let parent = if i == 0 { "AActor".to_string() } else { format!("ALevel{}", i - 1) };
            let include = if i == 0 { String::new() } else { format!("#include \"Level{}.h\"\n", i - 1) };
            let source = format!(
                "{include}#include \"Level{i}.generated.h\"\nUCLASS()\nclass ALevel{i} : public {parent}\n{{\n\
                 \tGENERATED_BODY()\npublic:\n\tUPROPERTY(EditAnywhere, Category = \"Level\")\n\tint32 Depth{i};\n}};\n"
            );
            (format!("Game/Level{i}.h"), source)
        })
        .collect()
}

// =============================================================================
// Header Benchmarks
// =============================================================================

fn bench_header(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_header");
    let source = combatant(0);

    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_with_input(BenchmarkId::new("combatant", source.len()), &source, |b, s| {
        b.iter(|| {
            let mut session = Session::new(ParserConfig::default());
            let unit = session.add_unit("Game/Combatant0.h", "Game", s.as_str());
            parse_header(&mut session, black_box(unit))
        });
    });

    group.bench_function("prescan", |b| b.iter(|| prescan(black_box(&source))));
    group.finish();
}

// =============================================================================
// Module Benchmarks
// =============================================================================

fn bench_module(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_module");

    for size in [10, 50] {
        let headers: Vec<_> = (0..size)
            .map(|i| (format!("Game/Combatant{i}.h"), combatant(i)))
            .collect();
        group.bench_with_input(BenchmarkId::new("independent", size), &headers, |b, headers| {
            b.iter(|| {
                let mut session = Session::new(ParserConfig::default());
                let units: Vec<_> = headers
                    .iter()
                    .map(|(name, source)| session.add_unit(name.as_str(), "Game", source.as_str()))
                    .collect();
                parse_module(&mut session, black_box(&units))
            });
        });

        // Reversed so every header has to pull its parent in first.
        let levels: Vec<_> = chain(size).into_iter().rev().collect();
        group.bench_with_input(BenchmarkId::new("inheritance_chain", size), &levels, |b, headers| {
            b.iter(|| {
                let mut session = Session::new(ParserConfig::default());
                let units: Vec<_> = headers
                    .iter()
                    .map(|(name, source)| session.add_unit(name.as_str(), "Game", source.as_str()))
                    .collect();
                parse_module(&mut session, black_box(&units))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_header, bench_module);
criterion_main!(benches);

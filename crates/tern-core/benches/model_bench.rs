use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tern_core::Model;

fn bench_model_build(c: &mut Criterion) {
    let toml_text = r#"
[[commands]]
name = "test"
description = "runs unit tests"
before = ["echo preparing"]
execute = "pytest"
after = ["echo done"]
examples = ["test --cov -vv", "test --last-failed"]
docker_container = "py"
docker_run_options = "-it -v .:/app -w /app"

[[commands]]
name = "build"
description = "builds the project"
execute = "cargo build --release"

[[docker_containers]]
name = "py"
docker_image = "python:3.9-alpine"

[[docker_containers]]
name = "stack"
docker_compose_file_path = "docker-compose.yml"
docker_compose_service = "app"
"#;

    c.bench_function("build_model", |b| {
        b.iter(|| {
            let model = Model::from_toml(black_box(toml_text)).unwrap();
            black_box(model);
        })
    });
}

criterion_group!(benches, bench_model_build);
criterion_main!(benches);

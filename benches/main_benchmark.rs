use criterion::{Criterion, criterion_group, criterion_main};
use qb::compiler::{CompilerOptions, GnuCompiler, LinkType, MsvcCompiler, Optimization, Toolset};
use qb::config::{self, BuildSettings, CliOverrides};
use qb::deps::Conanfile;
use qb::toolchain::MsvcInstall;
use std::hint::black_box;
use std::path::{Path, PathBuf};

const MOCK_CONFIG: &str = r#"
name = "bench_app"
type = "exe"
cppstd = 20
include = ["include", "vendor/include"]
define = ["NDEBUG"]
pkg = ["zlib"]

[package.zlib]
includes = ["vendor/zlib"]
links = ["z"]
"#;

const MOCK_BUILD_INFO: &str = "[includedirs]\n/conan/fmt/include\n/conan/zlib/include\n\
[libdirs]\n/conan/fmt/lib\n/conan/zlib/lib\n\
[libs]\nfmt\nz\n\
[system_libs]\npthread\n\
[defines]\nFMT_HEADER_ONLY\n\
[cxxflags]\n-fPIC\n\
[exelinkflags]\n-Wl,--gc-sections\n";

fn options() -> CompilerOptions {
    CompilerOptions {
        debug: true,
        strict: true,
        optimization: Optimization::Speed,
        include_directories: (0..16).map(|i| format!("include/{}", i)).collect(),
        defines: (0..8).map(|i| format!("FEATURE_{}=1", i)).collect(),
        link_libraries: vec!["z".into(), "m".into(), "pthread".into()],
        ..Default::default()
    }
}

fn bench_config_parse(c: &mut Criterion) {
    c.bench_function("parse_qb_toml", |b| {
        b.iter(|| {
            let _: config::QbConfig = toml::from_str(black_box(MOCK_CONFIG)).unwrap();
        })
    });
}

fn bench_binding(c: &mut Criterion) {
    let file: config::QbConfig = toml::from_str(MOCK_CONFIG).unwrap();
    let cli = CliOverrides {
        include: vec!["cli/include".into()],
        debug: true,
        ..Default::default()
    };

    c.bench_function("resolve_build_settings", |b| {
        b.iter(|| BuildSettings::resolve(black_box(&cli), black_box(Some(&file)), "bench").unwrap())
    });
}

fn bench_conan(c: &mut Criterion) {
    c.bench_function("parse_conanbuildinfo", |b| {
        b.iter(|| Conanfile::parse(black_box(MOCK_BUILD_INFO)).unwrap())
    });

    let manifest = Conanfile::parse(MOCK_BUILD_INFO).unwrap();
    c.bench_function("apply_conanbuildinfo", |b| {
        b.iter(|| {
            let mut options = CompilerOptions::default();
            manifest.apply(&mut options, LinkType::Executable, black_box(true));
            options
        })
    });
}

fn bench_command_lines(c: &mut Criterion) {
    let options = options();
    let gnu = GnuCompiler::new(Toolset::Clang, PathBuf::from("clang"));
    let msvc = MsvcCompiler::new(MsvcInstall {
        install_dir: PathBuf::from("VS"),
        tools_version: "14.38.33130".into(),
        sdk_dir: PathBuf::from("Kits"),
        sdk_version: "10.0.22621".into(),
    });
    let objects: Vec<PathBuf> = (0..64).map(|i| PathBuf::from(format!("obj/{}.o", i))).collect();

    c.bench_function("gnu_compile_command", |b| {
        b.iter(|| gnu.compile_command(black_box(Path::new("src/main.cpp")), Path::new("obj"), &options))
    });

    c.bench_function("gnu_link_command", |b| {
        b.iter(|| gnu.link_command(black_box(&objects), Path::new("app"), LinkType::Executable, &options))
    });

    c.bench_function("msvc_compile_command", |b| {
        b.iter(|| msvc.compile_command(black_box(Path::new("src/main.cpp")), Path::new("obj"), &options))
    });
}

criterion_group!(
    benches,
    bench_config_parse,
    bench_binding,
    bench_conan,
    bench_command_lines
);
criterion_main!(benches);

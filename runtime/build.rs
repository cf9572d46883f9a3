fn main() {
    println!("cargo:rerun-if-changed=csrc/print.c");

    // cc picks the C compiler for Cargo's TARGET, so `--target` cross-compiles this too.
    cc::Build::new()
        .file("csrc/print.c")
        .warnings(true)
        .compile("crossprint_print");
}

fn main() {
    // The intel_tex_2 ISPC kernels are C++ and reference the C++ runtime
    // personality routine (__gxx_personality_v0). Link the C++ standard
    // library so downstream binaries and test harnesses resolve it.
    println!("cargo:rustc-link-lib=dylib=stdc++");
}

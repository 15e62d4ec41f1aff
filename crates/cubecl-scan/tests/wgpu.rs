pub type TestRuntime = cubecl_wgpu::WgpuRuntime;

cubecl_scan::testgen_scan!();

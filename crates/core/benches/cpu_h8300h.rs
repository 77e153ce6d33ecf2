use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use emu_core::cpu_h8300h::{CpuH8300h, MemoryH8300h};

/// Simple memory implementation for benchmarking
struct BenchMemory {
    ram: Vec<u8>,
}

impl BenchMemory {
    fn new() -> Self {
        let mut ram = vec![0; 0x10000];

        // Reset vector points at 0x0100
        ram[0x0000] = 0x01;
        ram[0x0001] = 0x00;

        // A small arithmetic loop at 0x0100:
        // MOV.B #0x01, R0L ; F8 01
        ram[0x0100] = 0xF8;
        ram[0x0101] = 0x01;
        // ADD.B #0x03, R0L ; 88 03
        ram[0x0102] = 0x88;
        ram[0x0103] = 0x03;
        // MOV.W #0x1234, R1 ; 79 01 12 34
        ram[0x0104] = 0x79;
        ram[0x0105] = 0x01;
        ram[0x0106] = 0x12;
        ram[0x0107] = 0x34;
        // ADD.W R1, R2 ; 09 12
        ram[0x0108] = 0x09;
        ram[0x0109] = 0x12;
        // SHLL.B R0L ; 10 08
        ram[0x010A] = 0x10;
        ram[0x010B] = 0x08;
        // MOV.B R0L, @0xFF80:8 ; 38 80
        ram[0x010C] = 0x38;
        ram[0x010D] = 0x80;
        // BRA -16 ; 40 F0 (loop back to 0x0100)
        ram[0x010E] = 0x40;
        ram[0x010F] = 0xF0;

        Self { ram }
    }
}

impl MemoryH8300h for BenchMemory {
    fn read8(&mut self, addr: u16) -> u8 {
        self.ram[addr as usize]
    }

    fn write8(&mut self, addr: u16, val: u8) {
        self.ram[addr as usize] = val;
    }
}

fn bench_cpu_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_h8300h_step");

    group.bench_function("single_instruction", |b| {
        b.iter(|| {
            let mut cpu = CpuH8300h::new(BenchMemory::new());
            cpu.reset();
            cpu.step();
            black_box(cpu.pc);
        });
    });

    group.finish();
}

fn bench_cpu_multiple_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_h8300h_multiple_steps");

    for step_count in [10, 100, 1000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(step_count),
            step_count,
            |b, &count| {
                b.iter(|| {
                    let mut cpu = CpuH8300h::new(BenchMemory::new());
                    cpu.reset();
                    for _ in 0..count {
                        cpu.step();
                    }
                    black_box(cpu.instructions);
                });
            },
        );
    }

    group.finish();
}

fn bench_cpu_reset(c: &mut Criterion) {
    c.bench_function("cpu_h8300h_reset", |b| {
        let mut cpu = CpuH8300h::new(BenchMemory::new());
        b.iter(|| {
            cpu.reset();
            black_box(cpu.pc);
        });
    });
}

criterion_group!(
    benches,
    bench_cpu_step,
    bench_cpu_multiple_steps,
    bench_cpu_reset
);
criterion_main!(benches);

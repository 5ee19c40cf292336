//! floppotron-fw
//!
//! Six-voice floppy-drive synthesizer firmware for the Raspberry Pi Pico.
//! Wires the two library crates to the RP2040 peripherals:
//!
//! 1. MIDI bytes arrive on UART0 at 31250 baud and are framed into packets
//!    by `MidiDecoder`.
//! 2. The control task applies each packet to the `Synth`, reconciles held
//!    notes onto the six voices, advances envelopes and updates the CV and
//!    gate outputs once per control period.
//! 3. Each voice owns one PWM slice. Every time a slice wraps, the
//!    `PWM_IRQ_WRAP` handler toggles that drive's step line, so the slice
//!    period sets the pitch.
//!
//! The control task and the interrupt handler share only the per-voice
//! power flags in `POWERED`.

#![no_std]
#![no_main]

use core::cell::RefCell;
use core::sync::atomic::AtomicBool;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output, Pin};
use embassy_rp::interrupt;
use embassy_rp::interrupt::InterruptExt;
use embassy_rp::pac;
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{self, Pwm, Slice};
use embassy_rp::uart::{self, BufferedInterruptHandler, BufferedUartRx};
use embassy_rp::Peri;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Instant, Ticker};
use embedded_io::{Read, ReadReady};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use floppotron::voices::{
    EnvelopeConfig, ExpressionOutput, FrequencyOutput, Oscillator, Stepper, StepperError,
    Synth, SynthConfig, N_VOICES,
};
use floppotron_midi::{MidiDecoder, MidiTransport, DIN_BYTE_TIMEOUT_US};

// ---------------------------------------------------------------------------
// Interrupt binding and constants
// ---------------------------------------------------------------------------

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// MIDI DIN baud rate.
const MIDI_BAUD: u32 = 31_250;

/// PWM slice driving each voice, by voice index.
const VOICE_SLICES: [u8; N_VOICES] = [0, 2, 3, 4, 5, 6];

/// CV level = 7-bit value << 9, spanning the full 16-bit compare range.
const CV_SHIFT: u32 = 9;

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

/// Mechanical power flag per voice. Written by the oscillators in the
/// control task, read by the steppers in the wrap interrupt.
static POWERED: [AtomicBool; N_VOICES] = [const { AtomicBool::new(false) }; N_VOICES];

/// Interrupt-side halves of the voices. Installed once at startup.
static STEPPERS: Mutex<CriticalSectionRawMutex, RefCell<Option<[FloppyStepper; N_VOICES]>>> =
    Mutex::new(RefCell::new(None));

static RX_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

type FloppyVoice = Oscillator<'static, PwmTone, Output<'static>>;
type FloppyStepper = Stepper<'static, Output<'static>, Output<'static>>;
type FloppySynth = Synth<FloppyVoice, N_VOICES>;

// ---------------------------------------------------------------------------
// Hardware adapters
// ---------------------------------------------------------------------------

/// One free-running PWM slice used as a voice's tone generator.
///
/// Divider, period and duty are staged in `config` and latched into the
/// slice by `set_enabled`, which the oscillator always calls last.
struct PwmTone {
    pwm: Pwm<'static>,
    config: pwm::Config,
}

impl PwmTone {
    fn new<T: Slice>(slice: Peri<'static, T>) -> Self {
        let mut config = pwm::Config::default();
        config.enable = false;
        let pwm = Pwm::new_free(slice, config.clone());
        Self { pwm, config }
    }
}

impl FrequencyOutput for PwmTone {
    fn set_clock_divider(&mut self, divider: u8) {
        self.config.divider = divider.into();
    }

    fn set_period(&mut self, period: u16) {
        self.config.top = period;
    }

    fn set_duty(&mut self, level: u16) {
        self.config.compare_a = level;
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.config.enable = enabled;
        self.pwm.set_config(&self.config);
    }
}

/// Velocity and modulation CVs on PWM slice 1, plus the gate and the
/// on-board LED mirroring it.
struct CvOutput {
    pwm: Pwm<'static>,
    config: pwm::Config,
    gate: Output<'static>,
    led: Output<'static>,
}

impl CvOutput {
    fn update(&mut self, velocity: Option<u16>, modulation: Option<u16>) {
        let mut changed = false;
        if let Some(level) = velocity.filter(|&l| l != self.config.compare_a) {
            self.config.compare_a = level;
            changed = true;
        }
        if let Some(level) = modulation.filter(|&l| l != self.config.compare_b) {
            self.config.compare_b = level;
            changed = true;
        }
        if changed {
            self.pwm.set_config(&self.config);
        }
    }
}

impl ExpressionOutput for CvOutput {
    fn set_velocity(&mut self, velocity: u8) {
        self.update(Some(u16::from(velocity) << CV_SHIFT), None);
    }

    fn set_gate(&mut self, gate: bool) {
        let level = Level::from(gate);
        self.gate.set_level(level);
        self.led.set_level(level);
    }

    fn set_mod(&mut self, modulation: u8) {
        self.update(None, Some(u16::from(modulation) << CV_SHIFT));
    }
}

/// Polled MIDI byte source over the buffered UART0 receiver.
struct UartMidi {
    rx: BufferedUartRx,
}

impl UartMidi {
    fn poll(&mut self) -> Option<u8> {
        match self.rx.read_ready() {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                warn!("UART rx error: {}", e);
                return None;
            }
        }

        let mut byte = [0u8; 1];
        match self.rx.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            Ok(_) => None,
            Err(e) => {
                warn!("UART rx error: {}", e);
                None
            }
        }
    }
}

impl MidiTransport for UartMidi {
    fn read_byte(&mut self) -> u8 {
        loop {
            if let Some(byte) = self.poll() {
                return byte;
            }
        }
    }

    fn try_read_byte(&mut self, timeout_us: u32) -> Option<u8> {
        let deadline = Instant::now() + Duration::from_micros(u64::from(timeout_us));
        loop {
            if let Some(byte) = self.poll() {
                return Some(byte);
            }
            if Instant::now() >= deadline {
                return None;
            }
        }
    }
}

/// Build both halves of voice `slot` and enable its wrap interrupt.
fn floppy<T: Slice>(
    slot: u8,
    slice: Peri<'static, T>,
    step: Peri<'static, impl Pin>,
    dir: Peri<'static, impl Pin>,
    enable: Peri<'static, impl Pin>,
    envelope: &EnvelopeConfig,
) -> (FloppyVoice, FloppyStepper) {
    let index = usize::from(slot);
    let powered = &POWERED[index];

    let stepper = Stepper::new(
        Output::new(step, Level::Low),
        Output::new(dir, Level::Low),
        powered,
    );
    let oscillator = Oscillator::new(
        slot,
        PwmTone::new(slice),
        Output::new(enable, Level::Low),
        powered,
        envelope,
    );

    let mask = 1u32 << VOICE_SLICES[index];
    pac::PWM.intr().write(|w| w.0 = mask);
    pac::PWM.inte().modify(|w| w.0 |= mask);

    (oscillator, stepper)
}

// ---------------------------------------------------------------------------
// Interrupts
// ---------------------------------------------------------------------------

/// Step every voice whose slice wrapped since the last interrupt.
#[interrupt]
fn PWM_IRQ_WRAP() {
    let status = pac::PWM.ints().read().0;

    STEPPERS.lock(|cell| {
        let mut steppers = cell.borrow_mut();
        let Some(steppers) = steppers.as_mut() else {
            return;
        };
        for (slot, (stepper, &slice)) in steppers.iter_mut().zip(&VOICE_SLICES).enumerate() {
            if status & (1 << slice) == 0 {
                continue;
            }
            if let Err(StepperError::Pin(_)) = stepper.mechanical_step() {
                warn!("voice {}: step line write failed", slot);
            }
        }
    });

    pac::PWM.intr().write(|w| w.0 = status);
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Fixed-rate control loop.
///
/// Each period: drain every complete packet the UART has buffered, then
/// reconcile voices, advance envelopes and refresh the CV outputs. Note
/// changes therefore always land before reconciliation.
#[embassy_executor::task]
async fn control_task(
    mut decoder: MidiDecoder<UartMidi>,
    mut synth: FloppySynth,
    mut expression: CvOutput,
    period: Duration,
) {
    info!("Control task started, period {} us", period.as_micros());
    let mut ticker = Ticker::every(period);

    loop {
        while let Some(packet) = decoder.try_read() {
            debug!("MIDI {}", packet);
            synth.handle_packet(packet);
        }

        synth.run_cycle();
        synth.tick();
        synth.write_expression(&mut expression);

        ticker.next().await;
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("floppotron-fw starting");

    let config = SynthConfig::default();

    // ── Pin assignments ────────────────────────────────────────────────────
    // Voice  Slice  Step  Dir  Enable
    //   0      0     18    17    16
    //   1      2     14    15    19
    //   2      3     12    13    20
    //   3      4     10    11    21
    //   4      5      8     9    22
    //   5      6      5     6     7
    // MIDI_RX → GP1  (UART0)
    // CV_VEL  → GP2  (PWM1 A)
    // CV_MOD  → GP3  (PWM1 B)
    // GATE    → GP26
    // LED     → GP25
    // ───────────────────────────────────────────────────────────────────────

    let env = &config.envelope;
    let (osc0, step0) = floppy(0, p.PWM_SLICE0, p.PIN_18, p.PIN_17, p.PIN_16, env);
    let (osc1, step1) = floppy(1, p.PWM_SLICE2, p.PIN_14, p.PIN_15, p.PIN_19, env);
    let (osc2, step2) = floppy(2, p.PWM_SLICE3, p.PIN_12, p.PIN_13, p.PIN_20, env);
    let (osc3, step3) = floppy(3, p.PWM_SLICE4, p.PIN_10, p.PIN_11, p.PIN_21, env);
    let (osc4, step4) = floppy(4, p.PWM_SLICE5, p.PIN_8, p.PIN_9, p.PIN_22, env);
    let (osc5, step5) = floppy(5, p.PWM_SLICE6, p.PIN_5, p.PIN_6, p.PIN_7, env);

    // Steppers must be in place before the wrap interrupt is unmasked.
    STEPPERS.lock(|cell| {
        cell.replace(Some([step0, step1, step2, step3, step4, step5]));
    });
    interrupt::PWM_IRQ_WRAP.unpend();
    unsafe { interrupt::PWM_IRQ_WRAP.enable() };

    let synth = Synth::new([osc0, osc1, osc2, osc3, osc4, osc5], config);

    // ── MIDI input ───────────────────────────────────────────────────────────

    let mut uart_config = uart::Config::default();
    uart_config.baudrate = MIDI_BAUD;
    let rx = BufferedUartRx::new(p.UART0, Irqs, p.PIN_1, RX_BUFFER.init([0; 64]), uart_config);
    let decoder = MidiDecoder::new(UartMidi { rx }).with_byte_timeout(DIN_BYTE_TIMEOUT_US);

    // ── CV / gate outputs ────────────────────────────────────────────────────

    let mut cv_config = pwm::Config::default();
    cv_config.top = u16::MAX;
    let expression = CvOutput {
        pwm: Pwm::new_output_ab(p.PWM_SLICE1, p.PIN_2, p.PIN_3, cv_config.clone()),
        config: cv_config,
        gate: Output::new(p.PIN_26, Level::Low),
        led: Output::new(p.PIN_25, Level::Low),
    };

    // ── Spawn tasks ────────────────────────────────────────────────────────

    let period = Duration::from_micros(config.control_period_us());
    spawner.spawn(control_task(decoder, synth, expression, period).unwrap());

    info!("All tasks spawned");
}

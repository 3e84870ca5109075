#![no_std]
#![no_main]

extern crate panic_halt;
use lazy_static::lazy_static;

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};
use cortex_m::{interrupt::Mutex, peripheral::syst::SystClkSource, peripheral::NVIC};
use cortex_m_rt::{entry, exception};
use cortex_m_semihosting::{hprint, hprintln};
use embedded_hal::digital::v2::{InputPin, ToggleableOutputPin};
use stm32f1xx_hal::{
    gpio::{gpioa::PA0, Floating, Input},
    pac::{self, interrupt, Interrupt, EXTI},
    prelude::*,
};

use dcf77_clock::{edge::edge_for_level, frame, Config, Dcf77, EdgeMailbox, Event};

// Set if the receiver pulls its output low for the duration of a pulse.
const ACTIVE_LOW: bool = false;

static EDGES: EdgeMailbox = EdgeMailbox::new();
static MILLIS: AtomicU32 = AtomicU32::new(0);

lazy_static! {
    static ref MUTEX_EXTI: Mutex<RefCell<Option<EXTI>>> = Mutex::new(RefCell::new(None));
    static ref MUTEX_DCF77_PIN: Mutex<RefCell<Option<PA0<Input<Floating>>>>> =
        Mutex::new(RefCell::new(None));
}

#[entry]
fn main() -> ! {
    let stm_perip = pac::Peripherals::take().unwrap();
    let mut cortex_perip = cortex_m::Peripherals::take().unwrap();

    let mut flash = stm_perip.FLASH.constrain();
    let mut rcc = stm_perip.RCC.constrain();
    let clocks = rcc
        .cfgr
        .use_hse(8.mhz())
        .sysclk(72.mhz())
        .pclk1(36.mhz())
        .freeze(&mut flash.acr);

    // The AFIO clock has to run for EXTI. Line 0 is routed to port A after reset.
    let _afio = stm_perip.AFIO.constrain(&mut rcc.apb2);

    // Receiver output on PA0, indicator LED on PC13.
    let mut gpioa = stm_perip.GPIOA.split(&mut rcc.apb2);
    let mut gpioc = stm_perip.GPIOC.split(&mut rcc.apb2);
    let dcf77_pin = gpioa.pa0.into_floating_input(&mut gpioa.crl);
    let led = gpioc.pc13.into_push_pull_output(&mut gpioc.crh);

    // Interrupt on both edges of PA0.
    let exti = stm_perip.EXTI;
    exti.imr.modify(|_, w| w.mr0().set_bit());
    exti.rtsr.modify(|_, w| w.tr0().set_bit());
    exti.ftsr.modify(|_, w| w.tr0().set_bit());

    // SysTick every millisecond to timestamp the edges.
    let syst = &mut cortex_perip.SYST;
    syst.set_clock_source(SystClkSource::Core);
    syst.set_reload(clocks.sysclk().0 / 1_000 - 1);
    syst.clear_current();
    syst.enable_counter();
    syst.enable_interrupt();

    cortex_m::interrupt::free(|cs| {
        MUTEX_EXTI.borrow(cs).replace(Some(exti));
        MUTEX_DCF77_PIN.borrow(cs).replace(Some(dcf77_pin));
    });

    let nvic = &mut cortex_perip.NVIC;
    unsafe {
        NVIC::unmask(Interrupt::EXTI0);
        nvic.set_priority(Interrupt::EXTI0, 0x01);
    }
    NVIC::unpend(Interrupt::EXTI0);

    let mut decoder = match Dcf77::new(Config::default(), led) {
        Ok(decoder) => decoder,
        Err(e) => panic!("invalid DCF77 configuration: {}", e),
    };

    hprintln!("DCF77 radio clock, waiting for the minute mark").ok();
    loop {
        if let Some(event) = decoder.poll(&EDGES) {
            report(&decoder, &event);
        }
    }
}

fn report<P: ToggleableOutputPin>(decoder: &Dcf77<P>, event: &Event) {
    if decoder.is_verbose() {
        if let Some(symbol) = event.symbol() {
            hprint!("{}", symbol).ok();
        }
    }

    match event {
        Event::Synchronized => {
            hprintln!("\nSynced to DCF77").ok();
        }
        Event::Minute(Ok(time)) => {
            hprintln!("\n{} DCF77", time).ok();
        }
        Event::Minute(Err(e)) => {
            hprintln!("\n{}, continue collecting time info...", e).ok();
            hprintln!("{}", decoder.last_frame()).ok();
            hprintln!("{}", frame::LEGEND).ok();
        }
        _ => {}
    }
}

#[exception]
fn SysTick() {
    MILLIS.fetch_add(1, Ordering::Relaxed);
}

#[interrupt]
fn EXTI0() {
    let now = MILLIS.load(Ordering::Relaxed);

    cortex_m::interrupt::free(|cs| {
        if let Some(exti) = MUTEX_EXTI.borrow(cs).borrow().as_ref() {
            exti.pr.write(|w| w.pr0().set_bit());
        }
        if let Some(pin) = MUTEX_DCF77_PIN.borrow(cs).borrow().as_ref() {
            if let Ok(high) = pin.is_high() {
                EDGES.post(edge_for_level(high != ACTIVE_LOW), now);
            }
        }
    });
}

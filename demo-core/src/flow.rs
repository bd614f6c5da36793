// The demo run: bring up the card, write the payload, read it back, tear down.
//
// START -> BUS_INIT -> MOUNT -> FILE_WRITE -> FILE_READ -> TEARDOWN -> END
//
// Every stage returns Result<_, Fault>; the first failure short-circuits
// to run(), which is the only place a failure is shown. Storage is
// released by the Session/OpenFile guards on the way out, before the
// failure message goes up.

use embedded_hal::delay::DelayNs;
use log::{error, info};

use crate::config::{DemoConfig, READ_BUF_LEN};
use crate::console::{Console, Panel};
use crate::event::{Event, Fault, Stage};
use crate::storage::{Mounter, OpenMode, Session, SpiHost, Volume};

/// Run the whole demo once, showing progress on `console`.
///
/// Returns the fault that stopped the run, after it has been shown and
/// held on screen.
pub fn run<H, M, P, D>(
    host: &mut H,
    mounter: &mut M,
    console: &mut Console<P>,
    delay: &mut D,
    cfg: &DemoConfig,
) -> Result<(), Fault>
where
    H: SpiHost,
    M: Mounter<H::Bus>,
    P: Panel,
    D: DelayNs,
{
    console.show(&Event::Starting);

    match round_trip(host, mounter, console, delay, cfg) {
        Ok(()) => {
            console.show(&Event::Finished);
            delay.delay_ms(cfg.holds.final_ms);
            Ok(())
        }
        Err(fault) => {
            error!("demo: {:?} failed: {}", fault.stage(), fault.cause());
            console.show(&Event::Failed(&fault));
            delay.delay_ms(cfg.holds.error_ms);
            Err(fault)
        }
    }
}

fn round_trip<H, M, P, D>(
    host: &mut H,
    mounter: &mut M,
    console: &mut Console<P>,
    delay: &mut D,
    cfg: &DemoConfig,
) -> Result<(), Fault>
where
    H: SpiHost,
    M: Mounter<H::Bus>,
    P: Panel,
    D: DelayNs,
{
    let mut session = open_session(host, mounter, console, cfg)?;
    delay.delay_ms(cfg.holds.settle_ms);

    write_payload(&mut session, console, delay, cfg)?;

    let mut buf = [0u8; READ_BUF_LEN];
    let line = read_back(&mut session, cfg.file_name, &mut buf)?;
    console.show(&Event::ReadBack(line));

    session.teardown();
    Ok(())
}

/// Bus init then mount. A mount failure drops the bus with it.
pub fn open_session<H, M, P>(
    host: &mut H,
    mounter: &mut M,
    console: &mut Console<P>,
    cfg: &DemoConfig,
) -> Result<Session<M::Volume>, Fault>
where
    H: SpiHost,
    M: Mounter<H::Bus>,
    P: Panel,
{
    let bus = host
        .init_bus(&cfg.bus)
        .map_err(|e| Fault::new(Stage::BusInit, &e))?;
    info!(
        "storage: bus up at {} kHz (sclk {} miso {} mosi {} cs {})",
        cfg.bus.max_freq_khz, cfg.bus.sclk, cfg.bus.miso, cfg.bus.mosi, cfg.bus.cs
    );
    console.show(&Event::BusReady);

    let volume = mounter
        .mount(bus, &cfg.mount)
        .map_err(|e| Fault::new(Stage::Mount, &e))?;
    console.show(&Event::Mounted);

    Ok(Session::new(volume, cfg.bus, cfg.mount))
}

/// Create (or truncate) the demo file and write the payload into it.
pub fn write_payload<V, P, D>(
    session: &mut Session<V>,
    console: &mut Console<P>,
    delay: &mut D,
    cfg: &DemoConfig,
) -> Result<(), Fault>
where
    V: Volume,
    P: Panel,
    D: DelayNs,
{
    info!("storage: writing {}", session.path(cfg.file_name));

    let mut file = session
        .open(cfg.file_name, OpenMode::Write)
        .map_err(|e| Fault::new(Stage::FileCreate, &e))?;
    console.show(&Event::FileCreated);
    delay.delay_ms(cfg.holds.settle_ms);

    file.write_all(cfg.payload.as_bytes())
        .map_err(|e| Fault::new(Stage::FileWrite, &e))?;
    file.close().map_err(|e| Fault::new(Stage::FileWrite, &e))?;
    console.show(&Event::FileWritten);
    Ok(())
}

/// Reopen the demo file and read its first line into `buf`.
pub fn read_back<'b, V>(
    session: &mut Session<V>,
    name: &str,
    buf: &'b mut [u8],
) -> Result<&'b str, Fault>
where
    V: Volume,
{
    let mut file = session
        .open(name, OpenMode::Read)
        .map_err(|e| Fault::new(Stage::ReadBack, &e))?;
    let line = file
        .read_line(buf)
        .map_err(|e| Fault::new(Stage::ReadBack, &e))?;
    file.close().map_err(|e| Fault::new(Stage::ReadBack, &e))?;
    Ok(line)
}

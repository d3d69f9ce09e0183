use linux_drm_gbm::{Card, Driver, Format, Usage};

fn main() -> std::io::Result<()> {
    let card = Card::open(c"/dev/dri/card0").map_err(map_init_err)?;
    let drv = Driver::new(card).map_err(map_init_err)?;
    println!("Kernel driver: {} ({:?} backend)", drv.name(), drv.backend().kind());

    let usage = Usage::SCANOUT | Usage::RENDERING;
    for format in [Format::XRGB8888, Format::NV12] {
        if !drv.is_supported(format, usage) {
            println!("{format}: not supported");
            continue;
        }
        let bo = drv.create(1920, 1080, format, usage).map_err(map_err)?;
        println!(
            "{format}: {} plane(s), tiling {:?}, strides {:?}, offsets {:?}, sizes {:?}",
            bo.num_planes(),
            bo.tiling(),
            bo.strides(),
            bo.offsets(),
            bo.sizes(),
        );
        {
            let map = drv.map(&bo).map_err(map_err)?;
            println!("{format}: mapped {} bytes at {:p}", map.len(), map.as_ptr());
        }
        drv.destroy(bo).map_err(map_err)?;
    }

    drv.close().close().map_err(|e| e.into_std_io_error())?;
    Ok(())
}

fn map_init_err(e: linux_drm_gbm::InitError) -> std::io::Error {
    let e: linux_io::result::Error = e.into();
    e.into_std_io_error()
}

fn map_err(e: linux_drm_gbm::Error) -> std::io::Error {
    let e: linux_io::result::Error = e.into();
    e.into_std_io_error()
}

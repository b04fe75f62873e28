//! Request/response loop against a simulated motor controller

use mitsuba_bus::protocol::metrics;
use mitsuba_bus::{MessageKind, RegistryConfig, TelemetryRegistry};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Mitsuba Telemetry Loop");
    println!("======================\n");

    // The "controller" answers requests with its own registry.
    let mut controller = TelemetryRegistry::default();
    controller.status_mut().set_battery_voltage(1000);
    controller.status_mut().set_motor_rpm(1800);
    controller.status_mut().set_fet_temp(24);
    controller.control_mut().set_accelerator_position(620);
    controller.control_mut().set_regen_stat(true);

    let mut dash = TelemetryRegistry::new(RegistryConfig::default());

    for tick in 0..3u16 {
        controller.status_mut().set_motor_rpm(1800 + tick * 50);

        let request = dash.request_frames(true, true, tick == 2);
        println!("tick {tick}: request {:02X?}", request.as_ref());

        for kind in dash.request().requested_kinds() {
            let id = controller.config().id_of(kind);
            let frame = controller.encode(kind)?;
            dash.handle_known_frame(id, &frame)?;
            println!("  {id:08X}#{:02X?}", frame.as_ref());
        }

        println!("  {}", dash.status());
        println!("  {}", dash.control());
    }
    println!("  {}", dash.fault());

    let stats = metrics::snapshot();
    println!(
        "\nencoded {} frames, decoded {} ({} status)",
        stats.encoded_frames,
        stats.decoded_frames,
        stats.decoded(MessageKind::MotorStatus)
    );

    Ok(())
}

//! Text rendering of groups and session reports

use rds_monitor::{DecoderSet, MonitorReport, ProgramServiceScan};
use rds_protocol::{
    group_name, pty_name, AlertCBody, GroupHeader, GroupId, OdaMessage, PtyTable, TrafficMessage,
    Version,
};

/// One log line for a group: raw header, then what its decoder holds now
pub fn group_line(header: &GroupHeader, decoders: &DecoderSet) -> String {
    let detail = match header.group() {
        GroupId::BASIC_TUNING => {
            let basic = &decoders.basic;
            let [af0, af1] = header.block_c().to_be_bytes();
            let frequencies: String = basic
                .alternate_frequencies_khz()
                .iter()
                .map(|khz| format!(" {}.{}", khz / 1000, (khz % 1000) / 100))
                .collect();
            format!(
                "TA {} MS {} DI {:X} Ci {} PS '{}' AF {} {} ({}):{}",
                u8::from(basic.traffic_announcement),
                if basic.music { 'M' } else { 'S' },
                basic.decoder_id,
                basic.segment,
                basic.ps,
                af0,
                af1,
                basic.af_count,
                frequencies
            )
        }
        GroupId::SLOW_LABELING => {
            let slow = &decoders.slow_label;
            format!(
                "RPC {} LA {} VC {} SLC {:03X} PIN {:02}:{:02}",
                slow.paging_code,
                u8::from(slow.linkage_actuator),
                slow.variant,
                slow.slow_label,
                slow.item_hour(),
                slow.item_minute()
            )
        }
        GroupId::RADIOTEXT => {
            let rt = &decoders.radiotext;
            format!(
                "AB {} Si {:2} RT '{}'",
                if rt.ab { 'B' } else { 'A' },
                rt.segment,
                rt.text
            )
        }
        GroupId::OPEN_DATA => {
            let oda = &decoders.oda;
            let mut text = format!(
                "AGTC {} Msg {:04X} AID {:04X}",
                oda.app_group(),
                oda.message_word,
                oda.aid
            );
            match oda.message {
                Some(OdaMessage::SystemInfo { location_table, .. }) => {
                    text.push_str(&format!(" LTN {}", location_table));
                }
                Some(OdaMessage::Variant {
                    variant,
                    service_id,
                    ..
                }) => text.push_str(&format!(" VC {} SID {}", variant, service_id)),
                None => {}
            }
            text
        }
        GroupId::CLOCK_TIME => match &decoders.clock.time {
            Some(time) => format!("{} (local {})", time, time.local()),
            None => format!("invalid time ({} rejected)", decoders.clock.rejected),
        },
        GroupId::TRANSPARENT_DATA => {
            let tdc = &decoders.transparent;
            let [c, d] = tdc.data[usize::from(tdc.channel)];
            format!("CH {:2} {:04X} {:04X}", tdc.channel, c, d)
        }
        GroupId::TRAFFIC => decoders
            .traffic
            .message
            .as_ref()
            .map(traffic_text)
            .unwrap_or_default(),
        GroupId::PROGRAM_TYPE_NAME => {
            let ptyn = &decoders.ptyn;
            format!(
                "AB {} Ci {} PTYN '{}'",
                if ptyn.ab { 'B' } else { 'A' },
                ptyn.segment,
                ptyn.name
            )
        }
        GroupId::OTHER_NETWORKS => {
            let eon = &decoders.eon;
            let mut text = format!(
                "TP {} VC {:2} I {:04X} PI {} PS '{}'",
                u8::from(eon.tp_on),
                eon.variant,
                eon.info,
                eon.other_pi(),
                eon.ps
            );
            if let (Some(pty), Some(ta)) = (eon.pty(), eon.ta()) {
                text.push_str(&format!(" PTY {:2} TA {}", pty, u8::from(ta)));
            }
            text
        }
        other => other.name().to_string(),
    };
    format!("{} | {}", header, detail)
}

fn traffic_text(message: &TrafficMessage) -> String {
    match message {
        TrafficMessage::AlertC { duration, body, .. } => match body {
            AlertCBody::Single {
                diversion,
                direction,
                extent,
                event,
                location,
            } => format!(
                "Alert-C single D{} DIR{} Ext {} Eve {} Loc {:04X} Dur {}",
                u8::from(*diversion),
                u8::from(*direction),
                extent,
                event,
                location,
                duration
            ),
            AlertCBody::Multi { y, location } => {
                format!("Alert-C multi Y {:04X} Loc {:04X}", y, location)
            }
            AlertCBody::Tuning { variant, c, d } => {
                format!("Alert-C tuning VC {} {:04X} {:04X}", variant, c, d)
            }
        },
        TrafficMessage::Generic { x4, variant, c, d } => {
            format!("X4 {} VC {} {:04X} {:04X}", u8::from(*x4), variant, c, d)
        }
    }
}

/// Summary printed when a session ends
pub fn summary(report: &MonitorReport, table: PtyTable) -> String {
    let mut out = String::from("Scanned");
    if let Some(pi) = report.pi {
        out.push_str(&format!(" {}", pi));
    }
    if let Some(basic) = report.basic.as_ref().filter(|b| b.is_complete()) {
        out.push_str(&format!(" '{}'", basic.ps));
    }
    out.push_str(&format!(
        " for {} ms ({})\n",
        report.elapsed_ms,
        report.outcome.label()
    ));

    if let Some(header) = report.basic.as_ref().and_then(|b| b.header) {
        out.push_str(&format!(
            "PTY: {} {}\n",
            header.program_type,
            pty_name(header.program_type, table)
        ));
    }
    if let Some(rt) = report.radiotext.as_ref().filter(|rt| rt.valid_mask() != 0) {
        out.push_str(&format!("Radiotext: '{}'\n", rt.text));
    }
    if let Some(time) = report.clock.as_ref().and_then(|c| c.time) {
        out.push_str(&format!("Clock: {}\n", time));
    }
    if let Some(name) = report.ptyn.as_ref().filter(|p| p.is_complete()) {
        out.push_str(&format!("PTYN: '{}'\n", name.name));
    }
    if let Some(eon) = report.eon.as_ref().filter(|e| e.header.is_some()) {
        out.push_str(&format!("Other network: {} '{}'\n", eon.other_pi(), eon.ps));
    }

    if report.no_rds() {
        out.push_str("no RDS detected\n");
        return out;
    }

    let groups = &report.groups;
    out.push_str(&format!("Active groups {}:\n", groups.seen));
    for group_type in 0..16u8 {
        for (mask, version) in [(groups.seen_a, Version::A), (groups.seen_b, Version::B)] {
            if mask.contains(group_type) {
                out.push_str(&format!(
                    "    {:02}{} {} ({})\n",
                    group_type,
                    version.letter(),
                    group_name(group_type, version),
                    groups.count(group_type, version)
                ));
            }
        }
    }
    out
}

/// Result line of a Program Service scan
pub fn scan_line(scan: &ProgramServiceScan) -> String {
    let pi = scan
        .pi
        .map(|pi| pi.to_string())
        .unwrap_or_else(|| "----".to_string());
    if scan.is_complete() {
        format!("{} '{}' ({} ms)", pi, scan.name, scan.elapsed_ms)
    } else {
        format!("{} no complete name after {} ms", pi, scan.elapsed_ms)
    }
}

//! Table checks across every variant and supported platform.

use fluent_installer::{
    dispatch, procedure_id, AmazonRelease, Dispatch, HostProfile, InstallerVariant, Platform,
    RedHatRelease, Severity, UbuntuRelease,
};

fn host_for(platform: Platform, arch: &str) -> HostProfile {
    let (id, version) = match platform {
        Platform::Ubuntu(UbuntuRelease::Bionic) => ("ubuntu", "18.04"),
        Platform::Ubuntu(UbuntuRelease::Focal) => ("ubuntu", "20.04"),
        Platform::Ubuntu(UbuntuRelease::Jammy) => ("ubuntu", "22.04"),
        Platform::Ubuntu(UbuntuRelease::Noble) => ("ubuntu", "24.04"),
        Platform::Debian(release) => match release.codename() {
            "buster" => ("debian", "10"),
            "bullseye" => ("debian", "11"),
            _ => ("debian", "12"),
        },
        Platform::RedHat(RedHatRelease::El7) => ("centos", "7"),
        Platform::RedHat(RedHatRelease::El8) => ("rocky", "8.9"),
        Platform::RedHat(RedHatRelease::El9) => ("almalinux", "9.3"),
        Platform::AmazonLinux(AmazonRelease::V2) => ("amzn", "2"),
        Platform::AmazonLinux(AmazonRelease::V2023) => ("amzn", "2023"),
        Platform::Alpine => ("alpine", "3.19.1"),
    };
    let codename = match platform {
        Platform::Ubuntu(release) => release.codename(),
        Platform::Debian(release) => release.codename(),
        _ => "",
    };
    HostProfile::new(id, version, codename, arch)
}

#[test]
fn test_every_platform_selects_at_most_one_procedure() {
    for variant in InstallerVariant::all() {
        for platform in Platform::all() {
            for arch in ["x86_64", "aarch64"] {
                let host = host_for(platform, arch);
                let expected = procedure_id(variant, platform);

                match dispatch(&host, variant) {
                    Dispatch::Selected {
                        platform: selected,
                        procedure,
                        ..
                    } => {
                        assert_eq!(selected, platform, "{} on {}", variant, host);
                        assert_eq!(Some(procedure.id), expected, "{} on {}", variant, host);
                        assert_eq!(
                            procedure.steps.last().map(|s| s.severity),
                            Some(Severity::Fatal)
                        );
                    }
                    Dispatch::Unsupported(manual) => {
                        assert!(expected.is_none(), "{} on {} should be supported", variant, host);
                        assert!(!manual.steps.is_empty());
                    }
                }
            }
        }
    }
}

#[test]
fn test_unsupported_architecture_never_selects() {
    for variant in InstallerVariant::all() {
        for platform in Platform::all() {
            let host = host_for(platform, "riscv64");
            assert!(!dispatch(&host, variant).is_selected());
        }
    }
}

#[test]
fn test_known_support_gaps() {
    let noble = Platform::Ubuntu(UbuntuRelease::Noble);
    let bionic = Platform::Ubuntu(UbuntuRelease::Bionic);
    assert!(procedure_id(InstallerVariant::TdAgent4, noble).is_none());
    assert!(procedure_id(InstallerVariant::FluentPackage5, bionic).is_none());
    assert!(procedure_id(InstallerVariant::FluentPackage5, Platform::Alpine).is_none());
    for platform in Platform::all() {
        assert!(procedure_id(InstallerVariant::FluentBit, platform).is_some());
    }
}

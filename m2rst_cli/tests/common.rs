use assert_cmd::Command;

pub fn m2rst_cmd() -> Command {
	let mut cmd = Command::cargo_bin("m2rst").expect("m2rst binary should be built");
	cmd.env("NO_COLOR", "1");
	cmd
}

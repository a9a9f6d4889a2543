use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use base64::{engine::general_purpose, Engine as _};
use log::{debug, warn};

use crate::backend::automation::{ApplicationSession, Automation, AutomationError, OpenOptions};
use crate::models::backend::BackendKind;

const OK_MARKER: &str = "##OFFICE_TO_PDF_OK##";
const ERR_MARKER: &str = "##OFFICE_TO_PDF_ERR##";
const EXIT_GRACE: Duration = Duration::from_secs(10);
const POWERSHELL_ARGS: [&str; 7] = [
    "-NoLogo",
    "-NoProfile",
    "-NonInteractive",
    "-ExecutionPolicy",
    "Bypass",
    "-Command",
    "-",
];

/// 以 PowerShell 驅動 Office COM 介面；每個應用程式實例對應一個獨立的 PowerShell 程序
pub struct PowerShellAutomation {
    program: String,
}

impl PowerShellAutomation {
    pub fn new(program: impl Into<String>) -> Self {
        PowerShellAutomation { program: program.into() }
    }
}

impl Default for PowerShellAutomation {
    fn default() -> Self {
        PowerShellAutomation::new("powershell.exe")
    }
}

impl Automation for PowerShellAutomation {
    fn check(&self) -> Result<(), AutomationError> {
        if !cfg!(windows) {
            return Err(AutomationError::Missing(
                "Office 自動化需要 Windows 與 COM 介面".to_string(),
            ));
        }
        let status = Command::new(&self.program)
            .args(["-NoLogo", "-NoProfile", "-NonInteractive", "-Command", "exit 0"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| AutomationError::Missing(format!("無法執行 {}：{}", self.program, e)))?;
        if status.success() {
            Ok(())
        } else {
            Err(AutomationError::Missing(format!("{} 結束碼異常：{}", self.program, status)))
        }
    }

    fn launch(&self, kind: BackendKind) -> Result<Box<dyn ApplicationSession>, AutomationError> {
        if !cfg!(windows) {
            return Err(AutomationError::Missing(
                "Office 自動化需要 Windows 與 COM 介面".to_string(),
            ));
        }
        let mut session = PowerShellSession::spawn(&self.program)?;
        session.invoke(&format!("$app = New-Object -ComObject '{}'", kind.prog_id()))?;
        debug!("已啟動 {} 實例", kind);
        Ok(Box::new(session))
    }
}

struct PowerShellSession {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl PowerShellSession {
    fn spawn(program: &str) -> Result<Self, AutomationError> {
        let mut child = Command::new(program)
            .args(POWERSHELL_ARGS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    AutomationError::Missing(format!("找不到 {}：{}", program, e))
                }
                _ => AutomationError::Failed(format!("啟動 {} 失敗：{}", program, e)),
            })?;
        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AutomationError::Failed("無法取得 PowerShell 輸出".to_string()))?;
        let mut session = PowerShellSession {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        };
        session.invoke("[Console]::OutputEncoding = [Text.Encoding]::UTF8")?;
        Ok(session)
    }

    fn invoke(&mut self, script: &str) -> Result<(), AutomationError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| AutomationError::Failed("PowerShell 工作階段已關閉".to_string()))?;
        send_line(stdin, &wrap_script(script))
            .map_err(|e| AutomationError::Failed(format!("寫入 PowerShell 工作階段失敗：{}", e)))?;
        read_reply(&mut self.stdout)
    }

    fn wait_for_exit(&mut self) {
        let deadline = Instant::now() + EXIT_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(100)),
                _ => break,
            }
        }
        warn!("PowerShell 工作階段未在 {} 秒內結束，強制終止", EXIT_GRACE.as_secs());
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl ApplicationSession for PowerShellSession {
    fn set_headless(&mut self) -> Result<(), AutomationError> {
        self.invoke("$app.Visible = $false; $app.DisplayAlerts = 0")
    }

    fn open_document(&mut self, path: &Path, options: &OpenOptions) -> Result<(), AutomationError> {
        self.invoke(&open_script(path, options))
    }

    fn save_active_as(&mut self, target: &Path, format_code: i32) -> Result<(), AutomationError> {
        self.invoke(&save_script(target, format_code))
    }

    fn close_document(&mut self) -> Result<(), AutomationError> {
        self.invoke("if ($doc -ne $null) { $doc.Close(0) | Out-Null; $doc = $null }")
    }

    fn quit(&mut self) -> Result<(), AutomationError> {
        let result = self.invoke(
            "if ($app -ne $null) { $app.Quit() | Out-Null; \
             [void][Runtime.InteropServices.Marshal]::ReleaseComObject($app); $app = $null }",
        );
        if let Some(mut stdin) = self.stdin.take() {
            let _ = stdin.write_all(b"exit\n");
        }
        self.wait_for_exit();
        result
    }
}

impl Drop for PowerShellSession {
    fn drop(&mut self) {
        self.stdin.take();
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// 以 base64 傳遞路徑，避免主控台字碼頁破壞非 ASCII 檔名
fn ps_path(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let encoded = general_purpose::STANDARD.encode(absolute.to_string_lossy().as_bytes());
    format!("([Text.Encoding]::UTF8.GetString([Convert]::FromBase64String('{}')))", encoded)
}

fn ps_bool(value: bool) -> &'static str {
    if value {
        "$true"
    } else {
        "$false"
    }
}

fn open_script(path: &Path, options: &OpenOptions) -> String {
    let mut args = vec![
        ps_path(path),
        ps_bool(options.confirm_conversions).to_string(),
        ps_bool(options.read_only).to_string(),
        ps_bool(options.add_to_recent_files).to_string(),
    ];
    if let Some(revert) = options.revert {
        // PasswordDocument、PasswordTemplate 略過
        args.push("[Type]::Missing".to_string());
        args.push("[Type]::Missing".to_string());
        args.push(ps_bool(revert).to_string());
    }
    format!("$doc = $app.Documents.Open({})", args.join(", "))
}

/// 新版使用 SaveAs2，舊版退回 SaveAs
fn save_script(target: &Path, format_code: i32) -> String {
    format!(
        "$dst = {}; try {{ $doc.SaveAs2($dst, {code}) | Out-Null }} catch {{ $doc.SaveAs([ref]$dst, [ref]{code}) | Out-Null }}",
        ps_path(target),
        code = format_code
    )
}

fn wrap_script(script: &str) -> String {
    format!(
        "try {{ {}; [Console]::Out.WriteLine('{}') }} catch {{ [Console]::Out.WriteLine('{} ' + ($_.Exception.Message -replace '\\s+', ' ')) }}; [Console]::Out.Flush()",
        script, OK_MARKER, ERR_MARKER
    )
}

fn send_line<W: Write>(writer: &mut W, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

fn read_reply<R: BufRead>(reader: &mut R) -> Result<(), AutomationError> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| AutomationError::Failed(format!("讀取 PowerShell 輸出失敗：{}", e)))?;
        if read == 0 {
            return Err(AutomationError::Failed("PowerShell 工作階段意外結束".to_string()));
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if line.starts_with(OK_MARKER) {
            return Ok(());
        }
        if let Some(message) = line.strip_prefix(ERR_MARKER) {
            return Err(AutomationError::Failed(message.trim().to_string()));
        }
        if !line.is_empty() {
            debug!("PowerShell 輸出：{}", line);
        }
    }
}

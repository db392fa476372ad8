use crate::toolkit::{ConverterBinaries, ToolInvocation, ToolKind, ToolkitError};
use std::ffi::OsString;
use std::path::Path;

const GHOSTSCRIPT_MERGE_FLAGS: [&str; 5] = [
    "-dBATCH",
    "-dNOPAUSE",
    "-q",
    "-sDEVICE=pdfwrite",
    "-dPDFSETTINGS=/prepress",
];

pub fn build_merge_invocation<P: AsRef<Path>>(
    binaries: &ConverterBinaries,
    output: &Path,
    inputs: &[P],
) -> Result<ToolInvocation, ToolkitError> {
    if inputs.is_empty() {
        return Err(ToolkitError::NoInputs {
            tool: ToolKind::Ghostscript,
        });
    }

    let mut args: Vec<OsString> = GHOSTSCRIPT_MERGE_FLAGS
        .iter()
        .map(|flag| OsString::from(*flag))
        .collect();
    let mut output_arg = OsString::from("-sOutputFile=");
    output_arg.push(output);
    args.push(output_arg);
    args.extend(inputs.iter().map(|p| p.as_ref().as_os_str().to_os_string()));

    Ok(ToolInvocation {
        tool: ToolKind::Ghostscript,
        binary: binaries.ghostscript.clone(),
        args,
    })
}

pub fn build_ps_to_pdf_invocation(
    binaries: &ConverterBinaries,
    input: &Path,
    output: &Path,
) -> ToolInvocation {
    ToolInvocation {
        tool: ToolKind::Ps2Pdf,
        binary: binaries.ps2pdf.clone(),
        args: vec![input.as_os_str().to_os_string(), output.as_os_str().to_os_string()],
    }
}

pub fn build_text_to_ps_invocation(
    binaries: &ConverterBinaries,
    input: &Path,
    output: &Path,
) -> ToolInvocation {
    ToolInvocation {
        tool: ToolKind::Enscript,
        binary: binaries.enscript.clone(),
        args: vec![
            OsString::from("-p"),
            output.as_os_str().to_os_string(),
            input.as_os_str().to_os_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn merge_arguments_keep_input_order_and_whitespace() {
        let inputs = vec![
            PathBuf::from("/in/b report.pdf"),
            PathBuf::from("/in/a.pdf"),
            PathBuf::from("/in/$(rm -rf).pdf"),
        ];
        let invocation = build_merge_invocation(
            &ConverterBinaries::default(),
            Path::new("/out/merged file.pdf"),
            &inputs,
        )
        .expect("invocation");

        assert_eq!(invocation.binary, "gs");
        let args: Vec<String> = invocation
            .args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-dBATCH",
                "-dNOPAUSE",
                "-q",
                "-sDEVICE=pdfwrite",
                "-dPDFSETTINGS=/prepress",
                "-sOutputFile=/out/merged file.pdf",
                "/in/b report.pdf",
                "/in/a.pdf",
                "/in/$(rm -rf).pdf",
            ]
        );
    }

    #[test]
    fn merge_without_inputs_is_rejected() {
        let inputs: Vec<PathBuf> = Vec::new();
        let err = build_merge_invocation(&ConverterBinaries::default(), Path::new("/o.pdf"), &inputs)
            .expect_err("no inputs");
        assert!(matches!(err, ToolkitError::NoInputs { .. }));
    }

    #[test]
    fn enscript_writes_to_dash_p_target() {
        let invocation = build_text_to_ps_invocation(
            &ConverterBinaries::default(),
            Path::new("/in/notes.txt"),
            Path::new("/out/notes.ps"),
        );
        assert_eq!(invocation.binary, "enscript");
        assert_eq!(invocation.command_form(), "enscript -p /out/notes.ps /in/notes.txt");
    }
}

// =============================================================================
// LOG SINK - ZERO OVERHEAD
// =============================================================================
//
// Destino de saída dos logs do subsistema de threads.
//
// ARQUITETURA:
// Esta crate não é dona da UART. O kernel que a embute instala UMA vez um
// `LogSink` (normalmente um wrapper da COM1) e todos os macros `k*!` escrevem
// por aqui:
// - SEM core::fmt - Evita geração de código SSE/AVX
// - SEM alocação - Hex é formatado num buffer de stack
// - SEM lock - O sink é publicado via `spin::Once` e só lido depois disso
//
// Sem sink instalado, tudo é descartado (custo: um load atômico).
//
// FUNÇÕES DISPONÍVEIS:
// - emit_str(s)      : Envia string
// - emit_hex(v)      : Envia u64 em hexadecimal (0x + 16 dígitos)
// - emit_nl()        : Envia newline (\r\n)
//
// =============================================================================

use spin::Once;

/// Destino dos bytes de log (serial, ring buffer, ...).
pub trait LogSink: Sync {
    /// Escreve os bytes como vieram. Não pode bloquear nem alocar.
    fn write_bytes(&self, bytes: &[u8]);
}

static SINK: Once<&'static dyn LogSink> = Once::new();

/// Instala o sink global.
///
/// Retorna `false` se outro sink já estava instalado (o primeiro vence).
pub fn install_sink(sink: &'static dyn LogSink) -> bool {
    let mut installed = false;
    SINK.call_once(|| {
        installed = true;
        sink
    });
    installed
}

#[inline(always)]
fn write(bytes: &[u8]) {
    if let Some(sink) = SINK.get() {
        sink.write_bytes(bytes);
    }
}

// =============================================================================
// FUNÇÕES DE ESCRITA - CORE
// =============================================================================

/// Envia uma string para o sink.
#[inline(never)]
pub fn emit_str(s: &str) {
    write(s.as_bytes());
}

/// Envia uma nova linha (CRLF).
#[inline(never)]
pub fn emit_nl() {
    write(b"\r\n");
}

// =============================================================================
// FUNÇÕES DE ESCRITA - FORMATAÇÃO NUMÉRICA
// =============================================================================

#[inline(always)]
const fn nibble_to_ascii(nibble: u8) -> u8 {
    if nibble < 10 {
        b'0' + nibble
    } else {
        b'A' + (nibble - 10)
    }
}

/// Envia um valor u64 em formato hexadecimal.
///
/// Formato de saída: 0x0123456789ABCDEF (sempre 18 caracteres)
#[inline(never)]
pub fn emit_hex(value: u64) {
    let mut buf = [0u8; 18];
    buf[0] = b'0';
    buf[1] = b'x';
    for i in 0..16 {
        let shift = (15 - i) * 4;
        buf[2 + i] = nibble_to_ascii(((value >> shift) & 0xF) as u8);
    }
    write(&buf);
}

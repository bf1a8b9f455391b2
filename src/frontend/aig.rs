use crate::logic::{Lit, Var};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AigerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed aiger header")]
    BadHeader,
    #[error("malformed aiger literal")]
    BadLiteral,
    #[error("truncated aiger file")]
    Truncated,
    #[error("justice and fairness properties are not supported")]
    Unsupported,
    #[error("property index {0} out of range")]
    BadProperty(usize),
    #[error("no property to check")]
    NoProperty,
}

#[derive(Clone, Copy, Debug)]
pub struct AigLatch {
    /// variable holding the latch state
    pub input: u32,
    /// next-state literal
    pub next: u32,
    /// reset value; `None` leaves the latch uninitialized
    pub init: Option<bool>,
}

#[derive(Clone, Copy, Debug)]
pub struct AigAnd {
    pub lhs: u32,
    pub rhs0: u32,
    pub rhs1: u32,
}

/// An and-inverter graph in AIGER numbering: variable `v` is the literal
/// `2v`, negation sets the low bit, literal 0 is constant false.
#[derive(Clone, Debug, Default)]
pub struct Aig {
    pub max_var: u32,
    pub inputs: Vec<u32>,
    pub latchs: Vec<AigLatch>,
    pub outputs: Vec<u32>,
    pub bads: Vec<u32>,
    pub constraints: Vec<u32>,
    pub ands: Vec<AigAnd>,
}

#[inline]
pub fn to_lit(aiger_lit: u32) -> Lit {
    Lit::new(Var::new((aiger_lit >> 1) as usize), aiger_lit & 1 == 0)
}

impl Aig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AigerError> {
        Self::parse(&fs::read(path)?)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, AigerError> {
        let mut parser = Parser { bytes, pos: 0 };
        parser.parse()
    }

    /// Fresh input variable; returns its positive literal.
    pub fn new_input(&mut self) -> u32 {
        self.max_var += 1;
        self.inputs.push(self.max_var);
        self.max_var * 2
    }

    /// Fresh latch with the given next-state literal and reset value;
    /// returns its positive literal.
    pub fn new_latch(&mut self, next: u32, init: Option<bool>) -> u32 {
        self.max_var += 1;
        self.latchs.push(AigLatch {
            input: self.max_var,
            next,
            init,
        });
        self.max_var * 2
    }

    /// Fresh and gate; returns its positive literal.
    pub fn new_and(&mut self, rhs0: u32, rhs1: u32) -> u32 {
        self.max_var += 1;
        self.ands.push(AigAnd {
            lhs: self.max_var,
            rhs0,
            rhs1,
        });
        self.max_var * 2
    }

    fn check_lit(&self, lit: u32) -> Result<u32, AigerError> {
        if lit > self.max_var * 2 + 1 {
            return Err(AigerError::BadLiteral);
        }
        Ok(lit)
    }
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn line(&mut self) -> Result<&'a str, AigerError> {
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
            self.pos += 1;
        }
        if self.pos == self.bytes.len() {
            return Err(AigerError::Truncated);
        }
        self.pos += 1;
        std::str::from_utf8(&self.bytes[start..self.pos - 1]).map_err(|_| AigerError::BadLiteral)
    }

    fn byte(&mut self) -> Result<u8, AigerError> {
        let b = *self.bytes.get(self.pos).ok_or(AigerError::Truncated)?;
        self.pos += 1;
        Ok(b)
    }

    /// 7-bit little-endian delta code of the binary and section.
    fn delta(&mut self) -> Result<u32, AigerError> {
        let mut x: u64 = 0;
        let mut shift = 0;
        loop {
            let b = self.byte()?;
            x |= ((b & 0x7f) as u64) << shift;
            if b & 0x80 == 0 {
                return u32::try_from(x).map_err(|_| AigerError::BadLiteral);
            }
            shift += 7;
            if shift > 35 {
                return Err(AigerError::BadLiteral);
            }
        }
    }

    fn parse(&mut self) -> Result<Aig, AigerError> {
        let header = self.line()?;
        let mut tokens = header.split_ascii_whitespace();
        let format = tokens.next().ok_or(AigerError::BadHeader)?;
        let binary = match format {
            "aig" => true,
            "aag" => false,
            _ => return Err(AigerError::BadHeader),
        };
        let mut nums = [0usize; 9];
        let mut n = 0;
        for t in tokens {
            if n == nums.len() {
                return Err(AigerError::BadHeader);
            }
            nums[n] = t.parse().map_err(|_| AigerError::BadHeader)?;
            n += 1;
        }
        if n < 5 {
            return Err(AigerError::BadHeader);
        }
        let [m, i, l, o, a, b, c, j, f] = nums;
        if j > 0 || f > 0 {
            return Err(AigerError::Unsupported);
        }
        if m < i + l + a {
            return Err(AigerError::BadHeader);
        }
        let mut aig = Aig {
            max_var: m as u32,
            ..Default::default()
        };
        if binary {
            aig.inputs = (1..=i as u32).collect();
            for k in 0..l {
                let line = self.line()?;
                let mut it = line.split_ascii_whitespace();
                let next = self.parse_lit(&aig, it.next())?;
                let lit = 2 * (i + k + 1) as u32;
                let init = self.parse_init(it.next(), lit)?;
                aig.latchs.push(AigLatch {
                    input: lit >> 1,
                    next,
                    init,
                });
            }
        } else {
            for _ in 0..i {
                let line = self.line()?;
                let lit = self.parse_lit(&aig, Some(line.trim()))?;
                if lit & 1 != 0 || lit == 0 {
                    return Err(AigerError::BadLiteral);
                }
                aig.inputs.push(lit >> 1);
            }
            for _ in 0..l {
                let line = self.line()?;
                let mut it = line.split_ascii_whitespace();
                let lit = self.parse_lit(&aig, it.next())?;
                if lit & 1 != 0 || lit == 0 {
                    return Err(AigerError::BadLiteral);
                }
                let next = self.parse_lit(&aig, it.next())?;
                let init = self.parse_init(it.next(), lit)?;
                aig.latchs.push(AigLatch {
                    input: lit >> 1,
                    next,
                    init,
                });
            }
        }
        for _ in 0..o {
            let line = self.line()?;
            let lit = self.parse_lit(&aig, Some(line.trim()))?;
            aig.outputs.push(lit);
        }
        for _ in 0..b {
            let line = self.line()?;
            let lit = self.parse_lit(&aig, Some(line.trim()))?;
            aig.bads.push(lit);
        }
        for _ in 0..c {
            let line = self.line()?;
            let lit = self.parse_lit(&aig, Some(line.trim()))?;
            aig.constraints.push(lit);
        }
        if binary {
            for k in 0..a {
                let lhs = 2 * (i + l + k + 1) as u32;
                let delta0 = self.delta()?;
                if delta0 == 0 || delta0 > lhs {
                    return Err(AigerError::BadLiteral);
                }
                let rhs0 = lhs - delta0;
                let delta1 = self.delta()?;
                if delta1 > rhs0 {
                    return Err(AigerError::BadLiteral);
                }
                aig.ands.push(AigAnd {
                    lhs: lhs >> 1,
                    rhs0,
                    rhs1: rhs0 - delta1,
                });
            }
        } else {
            for _ in 0..a {
                let line = self.line()?;
                let mut it = line.split_ascii_whitespace();
                let lhs = self.parse_lit(&aig, it.next())?;
                if lhs & 1 != 0 || lhs == 0 {
                    return Err(AigerError::BadLiteral);
                }
                let rhs0 = self.parse_lit(&aig, it.next())?;
                let rhs1 = self.parse_lit(&aig, it.next())?;
                aig.ands.push(AigAnd {
                    lhs: lhs >> 1,
                    rhs0,
                    rhs1,
                });
            }
        }
        // symbol table and comments are ignored
        Ok(aig)
    }

    fn parse_lit(&self, aig: &Aig, token: Option<&str>) -> Result<u32, AigerError> {
        let lit = token
            .ok_or(AigerError::Truncated)?
            .parse()
            .map_err(|_| AigerError::BadLiteral)?;
        aig.check_lit(lit)
    }

    fn parse_init(&self, token: Option<&str>, lit: u32) -> Result<Option<bool>, AigerError> {
        match token {
            None | Some("0") => Ok(Some(false)),
            Some("1") => Ok(Some(true)),
            Some(t) => {
                let v: u32 = t.parse().map_err(|_| AigerError::BadLiteral)?;
                if v == lit {
                    Ok(None)
                } else {
                    Err(AigerError::BadLiteral)
                }
            }
        }
    }
}

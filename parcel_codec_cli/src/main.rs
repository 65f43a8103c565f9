use std::io::{self, Read};

use base64::{engine::general_purpose, Engine as _};
use clap::{Parser, Subcommand};
use parcel_codec::{Codec, EncryptedData, Error, Nonce};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct ActionOpen {
    /// Base64 encoded envelope, or - to read it from stdin
    #[arg(index = 1)]
    input: String,

    /// Input is a {"data": ...} request/response body instead of a bare envelope
    #[arg(short, long, default_value = "false")]
    json_body: bool,

    /// Re-indent the decrypted JSON
    #[arg(short, long, default_value = "false")]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct ActionSeal {
    /// Plaintext to seal, or - to read it from stdin
    #[arg(index = 1)]
    input: String,

    /// Hex encoded 12 byte nonce. Random if omitted
    #[arg(short, long)]
    nonce: Option<String>,

    /// Wrap the envelope in a {"data": ...} body
    #[arg(short, long, default_value = "false")]
    json_body: bool,
}

#[derive(Parser, Debug)]
struct ActionDigest {
    /// Hex encoded bytes to digest
    #[arg(index = 1)]
    input: String,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Verify and decrypt an envelope
    Open(ActionOpen),
    /// Encrypt and authenticate a payload
    Seal(ActionSeal),
    /// Print the field digest of some bytes
    Digest(ActionDigest),
}

#[derive(Parser, Debug)]
#[command(author, version)]
struct Args {
    /// Hex or base64 encoded AES key. Defaults to the game's key
    #[arg(short, long, global = true, env = "PARCEL_CODEC_KEY")]
    key: Option<String>,

    /// Derive the digest subkey from the key instead of using the game's constant
    #[arg(long, global = true, default_value = "false")]
    derived_subkey: bool,

    /// Verbose
    #[arg(short, long, global = true, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let codec = codec(args.key.as_deref(), args.derived_subkey)?;
    match args.action {
        Action::Open(action) => open(&codec, action),
        Action::Seal(action) => seal(&codec, action),
        Action::Digest(action) => digest(&codec, action),
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn codec(key: Option<&str>, derived_subkey: bool) -> Result<Codec, Error> {
    let key = match key {
        Some(key) => aes_key(key)?,
        None => parcel_codec::PROTOCOL_KEY.to_vec(),
    };
    debug!(bits = key.len() * 8, derived_subkey, "using key");
    if derived_subkey {
        Codec::with_derived_subkey(&key)
    } else {
        Codec::new(&key)
    }
}

fn aes_key(key: &str) -> Result<Vec<u8>, Error> {
    let key = key.trim();
    hex::decode(key)
        .or_else(|_| general_purpose::STANDARD.decode(key))
        .map_err(|_| Error::Other("expect AES key as hex or base64 string"))
}

fn read_input(input: &str) -> Result<Vec<u8>, Error> {
    Ok(match input {
        "-" => {
            let mut buf = vec![];
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
        input => input.as_bytes().to_vec(),
    })
}

fn parse_nonce(nonce: &str) -> Result<Nonce, Error> {
    let bytes = hex::decode(nonce.trim()).map_err(|_| Error::Hex)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| Error::InvalidNonce(bytes.len()))
}

fn open(codec: &Codec, args: ActionOpen) -> Result<(), Error> {
    let input = String::from_utf8(read_input(&args.input)?)?;
    let plaintext = match args.json_body {
        true => match codec.decrypt_json_response(&input)? {
            Some(plaintext) => plaintext,
            None => {
                debug!("body carries no data");
                return Ok(());
            }
        },
        false => codec.decrypt_json_data(&input)?,
    };
    if args.pretty {
        let value: serde_json::Value = serde_json::from_str(&plaintext)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{plaintext}");
    }
    Ok(())
}

fn seal(codec: &Codec, args: ActionSeal) -> Result<(), Error> {
    let plaintext = read_input(&args.input)?;
    let data = match args.nonce {
        Some(nonce) => codec.encrypt_json_data_with_nonce(&parse_nonce(&nonce)?, &plaintext),
        None => codec.encrypt_json_data(&plaintext),
    };
    if args.json_body {
        let body = serde_json::to_string(&EncryptedData { data: Some(data) })?;
        println!("{body}");
    } else {
        println!("{data}");
    }
    Ok(())
}

fn digest(codec: &Codec, args: ActionDigest) -> Result<(), Error> {
    let bytes = hex::decode(args.input.trim()).map_err(|_| Error::Hex)?;
    println!(
        "{}",
        hex::encode(parcel_codec::digest(codec.subkey(), &bytes))
    );
    Ok(())
}
